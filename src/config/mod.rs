//! Configuration module for Sumi-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and compiling them into immutable [`CrawlSettings`].
//!
//! # Example
//!
//! ```no_run
//! use sumi_trawl::config::{load_config, CrawlSettings};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! let settings = CrawlSettings::from_config(&config).unwrap();
//! println!("Crawling {} with {} workers", settings.seed, settings.max_workers);
//! ```

mod parser;
mod settings;
mod types;
mod validation;

// Re-export types
pub use settings::CrawlSettings;
pub use types::{
    Config, CrawlerConfig, FetchConfig, PriorityEntry, RobotsConfig, UserAgentConfig,
};
pub use validation::{validate, MAX_DELAY_SECONDS, MAX_WORKERS};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config_file};

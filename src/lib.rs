//! Sumi-Trawl: a polite single-domain web crawler
//!
//! This crate implements a bounded crawler that starts from one seed URL and
//! visits every reachable page on the same host, skipping duplicate URLs,
//! duplicate content, excluded paths and anything outside the seed's domain.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Trawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Parse error for {url}: {source}")]
    Parse { url: String, source: ParseError },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::VisitState,
        to: state::VisitState,
    },

    #[error("Worker {worker} terminated unexpectedly: {message}")]
    WorkerPanicked { worker: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are the only errors that stop a crawl before it starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Errors raised while fetching a single page
///
/// Always recoverable: the URL is reported as failed and the crawl goes on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Expected HTML, got {0}")]
    ContentMismatch(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read body: {0}")]
    Body(String),
}

impl FetchError {
    /// Returns true if a retry policy may try the request again
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Status(code) => (500..600).contains(code),
            _ => false,
        }
    }
}

/// Errors raised while extracting links from page content
///
/// Treated as "zero links found", never fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Malformed content: {0}")]
    Malformed(String),
}

/// Result type alias for Sumi-Trawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlSettings};
pub use crawler::{CancelHandle, Coordinator, Frontier};
pub use output::{CrawlEvent, CrawlSummary, VisitOutcome};
pub use state::VisitState;
pub use crate::url::{extract_domain, normalize_url, UrlClassifier};

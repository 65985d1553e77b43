//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The shared frontier and the content deduplicator
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - Overall crawl coordination across the worker pool

mod coordinator;
mod dedup;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::Coordinator;
pub use dedup::{ContentDeduplicator, Fingerprint};
pub use fetcher::{build_http_client, is_html, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{CancelHandle, Claim, Frontier, FrontierEntry, Take};
pub use parser::{resolve_link, HtmlLinkExtractor, LinkExtractor};

use crate::config::CrawlSettings;
use crate::output::CrawlSummary;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client, link extractor and robots policy
/// 2. Seed the frontier
/// 3. Fetch pages across the worker pool
/// 4. Extract and follow same-domain links
/// 5. Return the crawl summary
///
/// # Arguments
///
/// * `settings` - The validated crawl settings
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished (possibly cancelled)
/// * `Err(CrawlError)` - The crawl could not be started
///
/// # Example
///
/// ```no_run
/// use sumi_trawl::config::{load_config, CrawlSettings};
/// use sumi_trawl::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = crawl(CrawlSettings::from_config(&config)?).await?;
/// println!("{} pages visited", summary.total_visited);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(settings: CrawlSettings) -> Result<CrawlSummary, CrawlError> {
    Coordinator::new(settings)?.run().await
}

//! Shared helpers for the integration tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use sumi_trawl::config::{Config, CrawlSettings};
use sumi_trawl::crawler::{FetchedPage, Fetcher};
use sumi_trawl::FetchError;
use url::Url;

/// Creates a test configuration for `seed` with no delay and robots disabled
pub fn create_test_config(seed: &str, workers: u32) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = Some(seed.to_string());
    config.crawler.max_workers = workers;
    config.crawler.delay_seconds = 0.0;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.robots.respect = false;
    config
}

pub fn create_test_settings(seed: &str, workers: u32) -> CrawlSettings {
    CrawlSettings::from_config(&create_test_config(seed, workers)).unwrap()
}

/// In-memory site: each path maps to the hrefs its page links to
///
/// Every page body embeds its own path so bodies are distinct unless a test
/// registers an explicit body. Fetches are recorded in order.
#[derive(Default)]
pub struct GraphFetcher {
    pages: HashMap<String, String>,
    latency: Duration,
    fetched: Mutex<Vec<(String, Instant)>>,
}

impl GraphFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page at `path` linking to `links`
    pub fn page(mut self, path: &str, links: &[&str]) -> Self {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect();
        let body = format!("<html><body><h1>{}</h1>{}</body></html>", path, anchors);
        self.pages.insert(path.to_string(), body);
        self
    }

    /// Adds a page at `path` with a literal body
    pub fn raw(mut self, path: &str, body: &str) -> Self {
        self.pages.insert(path.to_string(), body.to_string());
        self
    }

    /// Sleeps this long inside every fetch
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Paths fetched so far, in fetch order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// When each fetch started, in fetch order
    pub fn fetch_times(&self) -> Vec<Instant> {
        self.fetched.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl Fetcher for GraphFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.fetched
            .lock()
            .unwrap()
            .push((url.path().to_string(), Instant::now()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let body = self.pages.get(url.path()).ok_or(FetchError::Status(404))?;
        Ok(FetchedPage {
            final_url: url.clone(),
            status: 200,
            content_type: "text/html".to_string(),
            body: body.clone().into_bytes(),
        })
    }
}

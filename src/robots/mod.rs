//! Robots.txt handling module
//!
//! The crawler consults robots.txt through the [`RobotsPolicy`] trait. When no
//! policy is wired in, every URL is presumed allowed.

mod cache;
mod parser;

pub use cache::CachedRobots;
pub use parser::{ParsedRobots, MAX_CRAWL_DELAY_SECS};

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Policy oracle deciding whether a URL may be fetched
#[async_trait]
pub trait RobotsPolicy: Send + Sync {
    /// Returns true if the URL may be fetched
    async fn is_allowed(&self, url: &Url) -> bool;

    /// Minimum gap the site asks for between requests, if any
    async fn crawl_delay(&self, _url: &Url) -> Option<Duration> {
        None
    }
}

/// Robots policy backed by each origin's `/robots.txt`
///
/// The file is fetched once per origin and cached. The cache lock is never
/// held while the request is in flight, so two workers may race to fetch the
/// same file; the second result simply overwrites the first.
pub struct HttpRobotsPolicy {
    client: Client,
    agent: String,
    cache: Mutex<HashMap<String, CachedRobots>>,
}

impl HttpRobotsPolicy {
    /// Creates a policy
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt requests
    /// * `agent` - Product token matched against `User-agent` lines
    pub fn new(client: Client, agent: impl Into<String>) -> Self {
        Self {
            client,
            agent: agent.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` against the robots.txt of `url`'s origin, fetching it if needed
    async fn with_robots<T>(&self, url: &Url, f: impl Fn(&ParsedRobots) -> T) -> T {
        let origin = url.origin().ascii_serialization();

        {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = cache.get(&origin).filter(|c| !c.is_stale()) {
                return f(&cached.content);
            }
        }

        let robots = fetch_robots(&self.client, url).await;
        let result = f(&robots);

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(origin, CachedRobots::new(robots));
        result
    }
}

#[async_trait]
impl RobotsPolicy for HttpRobotsPolicy {
    async fn is_allowed(&self, url: &Url) -> bool {
        self.with_robots(url, |robots| robots.is_allowed(url.as_str(), &self.agent))
            .await
    }

    async fn crawl_delay(&self, url: &Url) -> Option<Duration> {
        self.with_robots(url, |robots| robots.crawl_delay(&self.agent))
            .await
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Fetches robots.txt for the origin of `url`
///
/// Any failure (network error, non-2xx status, unreadable body) yields an
/// allow-all policy.
pub async fn fetch_robots(client: &Client, url: &Url) -> ParsedRobots {
    let robots_url = match url.join("/robots.txt") {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!("Cannot build robots.txt URL for {}: {}", url, e);
            return ParsedRobots::allow_all();
        }
    };

    tracing::debug!("Fetching {}", robots_url);
    let response = match client.get(robots_url.clone()).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}; allowing all", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "{} returned HTTP {}; allowing all",
            robots_url,
            response.status().as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}; allowing all", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

use serde::Deserialize;

/// Main configuration structure for Sumi-Trawl
///
/// This is the raw, file-level shape. It is turned into the immutable
/// [`CrawlSettings`](crate::config::CrawlSettings) before a crawl starts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(default)]
    pub priority: Vec<PriorityEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from; its host becomes the base domain
    #[serde(rename = "seed-url", default)]
    pub seed_url: Option<String>,

    /// URLs matching any of these patterns are never enqueued
    #[serde(rename = "exclude-patterns", default)]
    pub exclude_patterns: Vec<String>,

    /// Number of concurrent workers
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,

    /// Minimum gap between successive fetches of one worker (seconds)
    #[serde(rename = "delay-seconds", default = "default_delay_seconds")]
    pub delay_seconds: f64,

    /// Priority of links whose source page matches no priority rule
    #[serde(rename = "default-priority", default = "default_priority")]
    pub default_priority: u32,

    /// Priority the seed URL is enqueued with
    #[serde(rename = "seed-priority", default)]
    pub seed_priority: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: None,
            exclude_patterns: Vec::new(),
            max_workers: default_max_workers(),
            delay_seconds: default_delay_seconds(),
            default_priority: default_priority(),
            seed_priority: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt agent token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiTrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/sumi-trawl".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connection timeout (seconds)
    #[serde(
        rename = "connect-timeout-seconds",
        default = "default_connect_timeout_seconds"
    )]
    pub connect_timeout_seconds: u64,

    /// Extra attempts for 5xx responses and timeouts
    #[serde(rename = "max-retries", default)]
    pub max_retries: u32,

    /// Pause before each retry (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Robots.txt configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RobotsConfig {
    /// Whether robots.txt is fetched and honored
    #[serde(default = "default_true")]
    pub respect: bool,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self { respect: true }
    }
}

/// One row of the priority table
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityEntry {
    /// Regex tested against the URL of the page a link was found on
    pub pattern: String,

    /// Priority for links found on matching pages (lower is sooner)
    pub score: u32,
}

fn default_max_workers() -> u32 {
    5
}

fn default_delay_seconds() -> f64 {
    1.0
}

fn default_priority() -> u32 {
    10
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

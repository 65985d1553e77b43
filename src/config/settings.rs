use crate::config::types::{Config, UserAgentConfig};
use crate::config::validation::validate;
use crate::url::{extract_domain, normalize_url, ExclusionPattern, PriorityRule, UrlClassifier};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Validated, immutable runtime configuration for one crawl
///
/// Built once from a [`Config`]; every pattern is compiled and every number
/// range-checked, so constructing a crawl from it cannot fail on
/// configuration grounds.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Normalized seed URL
    pub seed: Url,

    /// Priority the seed is enqueued with
    pub seed_priority: u32,

    /// Domain filter, exclusion patterns and priority table
    pub classifier: UrlClassifier,

    /// Worker pool size (>= 1)
    pub max_workers: usize,

    /// Minimum gap between successive fetches of one worker
    pub delay: Duration,

    /// User agent identity
    pub user_agent: UserAgentConfig,

    /// Whole-request timeout
    pub request_timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Extra attempts for transient fetch failures
    pub max_retries: u32,

    /// Pause before each retry
    pub retry_delay: Duration,

    /// Whether robots.txt is fetched and honored
    pub respect_robots: bool,
}

impl CrawlSettings {
    /// Validates `config` and compiles it into runtime settings
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSettings)` - Ready to crawl
    /// * `Err(ConfigError)` - Invalid seed URL, malformed pattern or out-of-range value
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate(config)?;

        let seed_str = config
            .crawler
            .seed_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("seed-url is required".to_string()))?;
        let seed = normalize_url(seed_str)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed_str, e)))?;
        let base_domain = extract_domain(&seed)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("Seed URL '{}' has no host", seed)))?;

        let exclusions = config
            .crawler
            .exclude_patterns
            .iter()
            .map(|p| ExclusionPattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let priority_rules = config
            .priority
            .iter()
            .map(|entry| PriorityRule::new(&entry.pattern, entry.score))
            .collect::<Result<Vec<_>, _>>()?;

        let delay = Duration::try_from_secs_f64(config.crawler.delay_seconds).map_err(|e| {
            ConfigError::Validation(format!(
                "delay-seconds {} is out of range: {}",
                config.crawler.delay_seconds, e
            ))
        })?;

        let classifier = UrlClassifier::new(
            base_domain,
            exclusions,
            priority_rules,
            config.crawler.default_priority,
        );

        Ok(Self {
            seed,
            seed_priority: config.crawler.seed_priority,
            classifier,
            max_workers: config.crawler.max_workers as usize,
            delay,
            user_agent: config.user_agent.clone(),
            request_timeout: Duration::from_secs(config.fetch.timeout_seconds),
            connect_timeout: Duration::from_secs(config.fetch.connect_timeout_seconds),
            max_retries: config.fetch.max_retries,
            retry_delay: Duration::from_millis(config.fetch.retry_delay_ms),
            respect_robots: config.robots.respect,
        })
    }

    /// Base domain derived from the seed
    pub fn base_domain(&self) -> &str {
        self.classifier.base_domain()
    }
}

//! Robots.txt parser implementation
//!
//! Allow/disallow matching is delegated to the robotstxt crate; the
//! `Crawl-delay` extension is parsed here since the crate ignores it.

use robotstxt::DefaultMatcher;

/// Longest `Crawl-delay` honored, in seconds; larger values are clamped
pub const MAX_CRAWL_DELAY_SECS: f64 = 60.0;

/// Parsed robots.txt data
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given user agent token
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The product token, e.g. `SumiTrawl`
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A group naming the agent wins over the `*` group.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds, at most [`MAX_CRAWL_DELAY_SECS`]
    /// * `None` - If no applicable crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let agent = user_agent.to_lowercase();

        let mut group_agents: Vec<String> = Vec::new();
        let mut in_agent_lines = false;
        let mut for_agent: Option<f64> = None;
        let mut for_wildcard: Option<f64> = None;

        for line in self.content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // Consecutive user-agent lines share one group
                    if !in_agent_lines {
                        group_agents.clear();
                    }
                    in_agent_lines = true;
                    group_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_agent_lines = false;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if delay < 0.0 || !delay.is_finite() {
                        continue;
                    }
                    let delay = delay.min(MAX_CRAWL_DELAY_SECS);
                    if group_agents
                        .iter()
                        .any(|ua| !ua.is_empty() && ua != "*" && agent.contains(ua.as_str()))
                    {
                        for_agent.get_or_insert(delay);
                    } else if group_agents.iter().any(|ua| ua == "*") {
                        for_wildcard.get_or_insert(delay);
                    }
                }
                _ => in_agent_lines = false,
            }
        }

        for_agent.or(for_wildcard)
    }
}

use crate::ConfigError;
use regex::Regex;
use url::Url;

/// A compiled exclusion matcher
///
/// Patterns are regular expressions tested against the full normalized URL,
/// unanchored, so a plain word such as `login` behaves as a substring match.
#[derive(Debug, Clone)]
pub struct ExclusionPattern {
    regex: Regex,
}

impl ExclusionPattern {
    /// Compiles an exclusion pattern
    ///
    /// # Returns
    ///
    /// * `Ok(ExclusionPattern)` - The compiled pattern
    /// * `Err(ConfigError::InvalidPattern)` - The pattern is not a valid regex
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        if pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Exclusion pattern cannot be empty".to_string(),
            ));
        }
        let regex = Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid exclusion pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { regex })
    }

    /// Returns true if the URL matches this pattern
    pub fn matches(&self, url: &Url) -> bool {
        self.regex.is_match(url.as_str())
    }

    /// Returns the source text of the pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// One row of the priority table: URLs discovered on a page whose URL matches
/// `pattern` are enqueued with `score`
#[derive(Debug, Clone)]
pub struct PriorityRule {
    regex: Regex,
    score: u32,
}

impl PriorityRule {
    /// Compiles a priority rule
    pub fn new(pattern: &str, score: u32) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid priority pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { regex, score })
    }

    /// Returns the score if the source URL matches this rule
    pub fn score_for(&self, source: &Url) -> Option<u32> {
        self.regex.is_match(source.as_str()).then_some(self.score)
    }

    /// Returns the source text of the pattern
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the score assigned by this rule
    pub fn score(&self) -> u32 {
        self.score
    }
}

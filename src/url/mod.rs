//! URL handling module for Sumi-Trawl
//!
//! This module provides URL normalization, domain extraction, exclusion and
//! priority matching, and the classifier that decides which discovered links
//! may enter the frontier.

mod domain;
mod matcher;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{extract_domain, host_equals};
pub use matcher::{ExclusionPattern, PriorityRule};
pub use normalize::normalize_url;

/// Result of classifying a discovered URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Same host and not excluded - may be offered to the frontier
    Eligible,
    /// Host differs from the base domain
    OffDomain,
    /// Matched an exclusion pattern
    Excluded,
}

impl Classification {
    /// Returns true if the URL may enter the frontier
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Pure, side-effect-free URL rules for one crawl
///
/// The classifier is built once from the validated configuration and shared
/// read-only between workers.
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    base_domain: String,
    exclusions: Vec<ExclusionPattern>,
    priority_rules: Vec<PriorityRule>,
    default_priority: u32,
}

impl UrlClassifier {
    /// Creates a classifier for `base_domain`
    ///
    /// # Arguments
    ///
    /// * `base_domain` - Host every crawled URL must have (compared exactly)
    /// * `exclusions` - Patterns that keep matching URLs out of the frontier
    /// * `priority_rules` - Ordered source-URL rules, first match wins
    /// * `default_priority` - Score used when no rule matches
    pub fn new(
        base_domain: impl Into<String>,
        exclusions: Vec<ExclusionPattern>,
        priority_rules: Vec<PriorityRule>,
        default_priority: u32,
    ) -> Self {
        Self {
            base_domain: base_domain.into().to_lowercase(),
            exclusions,
            priority_rules,
            default_priority,
        }
    }

    /// The configured base domain
    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// The compiled exclusion patterns
    pub fn exclusions(&self) -> &[ExclusionPattern] {
        &self.exclusions
    }

    /// The compiled priority table
    pub fn priority_rules(&self) -> &[PriorityRule] {
        &self.priority_rules
    }

    /// True iff the URL's host exactly equals the base domain
    pub fn is_same_domain(&self, url: &Url) -> bool {
        host_equals(url, &self.base_domain)
    }

    /// True iff any exclusion pattern matches the URL
    pub fn is_excluded(&self, url: &Url) -> bool {
        self.exclusions.iter().any(|p| p.matches(url))
    }

    /// Priority for links discovered on `source` (lower is crawled sooner)
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_trawl::url::{PriorityRule, UrlClassifier};
    /// use url::Url;
    ///
    /// let rules = vec![PriorityRule::new(r"/page/\d+$", 1).unwrap()];
    /// let classifier = UrlClassifier::new("example.com", vec![], rules, 10);
    ///
    /// let listing = Url::parse("https://example.com/blog/page/2").unwrap();
    /// let article = Url::parse("https://example.com/blog/hello").unwrap();
    /// assert_eq!(classifier.priority_of(&listing), 1);
    /// assert_eq!(classifier.priority_of(&article), 10);
    /// ```
    pub fn priority_of(&self, source: &Url) -> u32 {
        self.priority_rules
            .iter()
            .find_map(|rule| rule.score_for(source))
            .unwrap_or(self.default_priority)
    }

    /// Classifies a candidate URL
    ///
    /// Off-domain is checked first, so an external URL that also matches an
    /// exclusion pattern is reported as off-domain.
    pub fn classify(&self, url: &Url) -> Classification {
        if !self.is_same_domain(url) {
            Classification::OffDomain
        } else if self.is_excluded(url) {
            Classification::Excluded
        } else {
            Classification::Eligible
        }
    }

    /// True iff the URL is same-domain and not excluded
    pub fn is_eligible(&self, url: &Url) -> bool {
        self.classify(url).is_eligible()
    }
}

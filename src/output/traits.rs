//! Event sink traits and types
//!
//! This module defines the `(url, outcome)` event shape every visit produces
//! and the trait interface for consumers of that stream.

use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Final outcome of one URL as seen by the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisitOutcome {
    /// Fetched, novel content, links extracted
    Visited,

    /// Transport or HTTP failure
    FetchFailed,

    /// Body identical to an already seen page
    DuplicateContent,

    /// Matched an exclusion pattern or was disallowed by robots.txt
    Excluded,
}

impl VisitOutcome {
    /// Stable snake_case name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visited => "visited",
            Self::FetchFailed => "fetch_failed",
            Self::DuplicateContent => "duplicate_content",
            Self::Excluded => "excluded",
        }
    }

    /// Parses the snake_case name back into an outcome
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "visited" => Some(Self::Visited),
            "fetch_failed" => Some(Self::FetchFailed),
            "duplicate_content" => Some(Self::DuplicateContent),
            "excluded" => Some(Self::Excluded),
            _ => None,
        }
    }
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the observable output stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlEvent {
    /// The URL the outcome belongs to
    pub url: String,

    /// What happened to it
    pub outcome: VisitOutcome,

    /// Failure reason or exclusion cause, if any
    pub detail: Option<String>,
}

impl CrawlEvent {
    /// Creates an event without detail
    pub fn new(url: impl Into<String>, outcome: VisitOutcome) -> Self {
        Self {
            url: url.into(),
            outcome,
            detail: None,
        }
    }

    /// Attaches a detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Consumer of crawl events
///
/// Sinks are called from worker tasks, so implementations must be cheap and
/// must not block.
pub trait EventSink: Send + Sync {
    /// Records one event
    fn record(&self, event: &CrawlEvent);
}

/// Forwards every event into an unbounded channel
///
/// Events are dropped silently once the receiver is gone.
pub struct ChannelSink {
    sender: UnboundedSender<CrawlEvent>,
}

impl ChannelSink {
    /// Creates a sink writing into `sender`
    pub fn new(sender: UnboundedSender<CrawlEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn record(&self, event: &CrawlEvent) {
        let _ = self.sender.send(event.clone());
    }
}

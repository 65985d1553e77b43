/// Visit state definitions for tracking a single URL through the pipeline
///
/// Every claimed URL walks
/// `Pending -> Fetching -> (FetchFailed | Fetched) -> (DuplicateContent | Parsed) -> Extracted -> Done`,
/// and every branch ends in `Done`.
use std::fmt;

/// Represents the current state of one URL visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitState {
    // ===== Active States =====
    /// Claimed from the frontier, not yet requested
    Pending,

    /// Request in flight
    Fetching,

    /// Body received
    Fetched,

    /// Body handed to the link extractor
    Parsed,

    /// Links classified and offered to the frontier
    Extracted,

    // ===== Branch Ends =====
    /// Fetch raised a transport or HTTP error
    FetchFailed,

    /// Body fingerprint was already known
    DuplicateContent,

    // ===== Terminal =====
    /// Pipeline finished for this URL
    Done,
}

impl VisitState {
    /// Returns true only for `Done`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Checks whether `next` is a legal successor of this state
    ///
    /// `Pending -> Done` is allowed for URLs that are claimed but never
    /// fetched (robots denial).
    pub fn can_transition_to(&self, next: VisitState) -> bool {
        use VisitState::*;
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Pending, Done)
                | (Fetching, FetchFailed)
                | (Fetching, Fetched)
                | (Fetched, DuplicateContent)
                | (Fetched, Parsed)
                | (Parsed, Extracted)
                | (FetchFailed, Done)
                | (DuplicateContent, Done)
                | (Extracted, Done)
        )
    }

    /// Stable snake_case name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::Parsed => "parsed",
            Self::Extracted => "extracted",
            Self::FetchFailed => "fetch_failed",
            Self::DuplicateContent => "duplicate_content",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! State module for tracking crawl progress
//!
//! `VisitState` tracks a single URL through the visit pipeline. Shared crawl
//! state (queue, visited set, fingerprints) lives with the crawler components
//! that guard it.

mod visit_state;

pub use visit_state::VisitState;

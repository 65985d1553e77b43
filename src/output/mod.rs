//! Output module for crawl events and summaries
//!
//! This module handles:
//! - The `(url, outcome)` event stream and its sinks
//! - Aggregating events into crawl statistics
//! - Printing the final summary

pub mod stats;
mod traits;

pub use stats::{print_summary, CrawlReport, CrawlSummary};
pub use traits::{ChannelSink, CrawlEvent, EventSink, VisitOutcome};

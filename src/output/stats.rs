//! Crawl statistics aggregation
//!
//! This module collects the event stream into counters and produces the
//! final summary of a crawl.

use crate::output::traits::{CrawlEvent, VisitOutcome};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

/// Thread-safe accumulator for crawl events
///
/// Excluded URLs are kept as a set so a login link that appears on every page
/// is counted once.
#[derive(Debug, Default)]
pub struct CrawlReport {
    inner: Mutex<ReportInner>,
}

#[derive(Debug, Default)]
struct ReportInner {
    visited: u64,
    duplicates: u64,
    failures: Vec<(String, String)>,
    excluded: BTreeSet<String>,
}

impl CrawlReport {
    /// Creates an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event
    ///
    /// # Returns
    ///
    /// `false` if the event repeats an exclusion already recorded, in which
    /// case it should not be forwarded to other sinks.
    pub fn record(&self, event: &CrawlEvent) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match event.outcome {
            VisitOutcome::Visited => inner.visited += 1,
            VisitOutcome::DuplicateContent => inner.duplicates += 1,
            VisitOutcome::FetchFailed => {
                let reason = event.detail.clone().unwrap_or_default();
                inner.failures.push((event.url.clone(), reason));
            }
            VisitOutcome::Excluded => return inner.excluded.insert(event.url.clone()),
        }
        true
    }

    /// Number of pages visited so far
    pub fn visited_count(&self) -> u64 {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).visited
    }

    /// Builds the final summary
    ///
    /// # Arguments
    ///
    /// * `visited_set` - Every URL claimed by a worker during the crawl
    /// * `started_at` / `finished_at` - Wall-clock bounds of the run
    /// * `elapsed` - Monotonic run duration
    /// * `worker_failures` - Workers that terminated abnormally
    /// * `cancelled` - Whether the crawl was cut short
    pub fn summarize(
        &self,
        visited_set: BTreeSet<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        elapsed: Duration,
        worker_failures: usize,
        cancelled: bool,
    ) -> CrawlSummary {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        CrawlSummary {
            visited_set,
            total_visited: inner.visited,
            total_failed: inner.failures.len() as u64,
            total_duplicate: inner.duplicates,
            total_excluded: inner.excluded.len() as u64,
            failures: inner.failures.clone(),
            excluded: inner.excluded.iter().cloned().collect(),
            worker_failures,
            cancelled,
            started_at,
            finished_at,
            elapsed,
        }
    }
}

/// Result artifact of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Every URL a worker claimed (visited, failed, duplicate or denied)
    pub visited_set: BTreeSet<String>,

    /// Pages fetched with novel content
    pub total_visited: u64,

    /// Pages whose fetch failed
    pub total_failed: u64,

    /// Pages skipped as duplicate content
    pub total_duplicate: u64,

    /// Unique URLs kept out by exclusion patterns or robots.txt
    pub total_excluded: u64,

    /// Failed URLs with their reasons, in the order they failed
    pub failures: Vec<(String, String)>,

    /// Excluded URLs, sorted
    pub excluded: Vec<String>,

    /// Workers that terminated abnormally
    pub worker_failures: usize,

    /// Whether the crawl was cancelled before the frontier drained
    pub cancelled: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// True if no worker crashed
    pub fn is_clean(&self) -> bool {
        self.worker_failures == 0
    }

    /// Pages per second over the whole run
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.visited_set.len() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints a summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
/// * `list_visited` - Also print every URL of the visited set
pub fn print_summary(summary: &CrawlSummary, list_visited: bool) {
    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Started:  {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!(
        "  Duration: {:.2}s ({:.2} URLs/sec)",
        summary.elapsed.as_secs_f64(),
        summary.rate()
    );
    if summary.cancelled {
        println!("  Status:   cancelled");
    }
    println!();

    println!("Outcomes:");
    println!("  Visited:           {}", summary.total_visited);
    println!("  Fetch failed:      {}", summary.total_failed);
    println!("  Duplicate content: {}", summary.total_duplicate);
    println!("  Excluded:          {}", summary.total_excluded);
    println!("  URLs claimed:      {}", summary.visited_set.len());
    println!();

    if !summary.failures.is_empty() {
        println!("Failures:");
        for (url, reason) in &summary.failures {
            println!("  - {} ({})", url, reason);
        }
        println!();
    }

    if summary.worker_failures > 0 {
        println!("Worker failures: {}", summary.worker_failures);
        println!();
    }

    if list_visited {
        println!("Visited URLs ({}):", summary.visited_set.len());
        for url in &summary.visited_set {
            println!("  {}", url);
        }
    }
}

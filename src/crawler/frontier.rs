//! Shared crawl frontier
//!
//! The frontier owns the pending-URL priority queue, the index of queued URLs
//! and the visited set. All three live behind one lock so that claiming a URL
//! is atomic with the membership check.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use url::Url;

/// A URL waiting in the frontier
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// The normalized URL
    pub url: Url,

    /// Priority value (lower is fetched first)
    pub priority: u32,

    /// Insertion order, used to break priority ties FIFO
    seq: u64,
}

// BinaryHeap is a max-heap: reverse both keys so the lowest priority value,
// then the oldest entry, is popped first
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for FrontierEntry {}

#[derive(Debug, Default)]
struct FrontierInner {
    queue: BinaryHeap<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    next_seq: u64,
    in_flight: usize,
}

/// Result of [`Frontier::take`]
#[derive(Debug)]
pub enum Take {
    /// A URL was claimed; it is already in the visited set
    Claimed(Claim),

    /// The queue is empty but another visit is still in flight and may add links
    Idle,

    /// The queue is empty and nothing is in flight, or the crawl was cancelled
    Drained,
}

/// Thread-safe crawl frontier
///
/// # Invariants
///
/// - A URL enters the queue at most once over the frontier's lifetime
/// - The visited set only grows
/// - `take` reports [`Take::Drained`] only when the queue is empty and no
///   claim is outstanding (or after cancellation)
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    cancelled: AtomicBool,
    notify: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueues `url` unless it was already queued or visited
    ///
    /// # Returns
    ///
    /// `true` if the URL was inserted, `false` if the offer was a no-op
    pub fn offer(&self, url: Url, priority: u32) -> bool {
        let inserted = {
            let mut inner = self.lock();
            let key = url.as_str();
            if inner.visited.contains(key) || inner.queued.contains(key) {
                false
            } else {
                inner.queued.insert(key.to_string());
                let seq = inner.next_seq;
                inner.next_seq += 1;
                inner.queue.push(FrontierEntry { url, priority, seq });
                true
            }
        };

        if inserted {
            self.notify.notify_waiters();
        }
        inserted
    }

    /// Removes the highest-priority pending URL and claims it
    ///
    /// The URL is moved into the visited set in the same critical section, so
    /// no other worker can claim it. The returned [`Claim`] counts as in
    /// flight until dropped.
    pub fn take(self: &Arc<Self>) -> Take {
        if self.is_cancelled() {
            return Take::Drained;
        }

        let mut inner = self.lock();
        while let Some(entry) = inner.queue.pop() {
            let key = entry.url.as_str().to_string();
            inner.queued.remove(&key);
            // Already claimed through a redirect
            if !inner.visited.insert(key) {
                continue;
            }
            inner.in_flight += 1;
            return Take::Claimed(Claim {
                frontier: Arc::clone(self),
                url: entry.url,
                priority: entry.priority,
            });
        }

        if inner.in_flight > 0 {
            Take::Idle
        } else {
            Take::Drained
        }
    }

    /// Adds `url` to the visited set; idempotent
    ///
    /// # Returns
    ///
    /// `true` if the URL was not visited before
    pub fn mark_visited(&self, url: &Url) -> bool {
        self.lock().visited.insert(url.as_str().to_string())
    }

    /// Checks if `url` has been claimed or marked visited
    pub fn is_visited(&self, url: &Url) -> bool {
        self.lock().visited.contains(url.as_str())
    }

    /// Checks if `url` is waiting in the queue
    pub fn is_queued(&self, url: &Url) -> bool {
        self.lock().queued.contains(url.as_str())
    }

    /// Number of pending URLs
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Returns true if no URL is pending
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of outstanding claims
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Copy of the visited set, sorted
    pub fn visited_snapshot(&self) -> BTreeSet<String> {
        self.lock().visited.iter().cloned().collect()
    }

    /// Makes every subsequent `take` return [`Take::Drained`]
    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::SeqCst)
    }

    /// Waits until new work is offered, a claim is released, or `timeout` elapses
    pub async fn wait_for_work(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.notify.notified()).await;
    }

    fn release(&self) {
        {
            let mut inner = self.lock();
            inner.in_flight = inner.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }
}

/// A URL claimed by one worker
///
/// Dropping the claim (including during a panic unwind) releases the
/// in-flight slot and wakes idle workers.
pub struct Claim {
    frontier: Arc<Frontier>,
    url: Url,
    priority: u32,
}

impl Claim {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }
}

impl fmt::Debug for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claim")
            .field("url", &self.url.as_str())
            .field("priority", &self.priority)
            .finish()
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.frontier.release();
    }
}

/// Handle for cancelling a running crawl from outside
#[derive(Debug, Clone)]
pub struct CancelHandle {
    frontier: Arc<Frontier>,
}

impl CancelHandle {
    pub(crate) fn new(frontier: Arc<Frontier>) -> Self {
        Self { frontier }
    }

    /// Requests cooperative cancellation; in-flight visits finish normally
    pub fn cancel(&self) {
        tracing::info!("Cancellation requested");
        self.frontier.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.frontier.is_cancelled()
    }
}

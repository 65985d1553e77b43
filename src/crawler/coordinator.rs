//! Crawler coordinator - main crawl orchestration logic
//!
//! This module owns the worker pool and drives every claimed URL through the
//! visit pipeline:
//! - Checking robots.txt
//! - Pacing each worker by the politeness delay
//! - Fetching and deduplicating content
//! - Extracting, classifying and enqueueing links
//! - Emitting `(url, outcome)` events

use crate::config::CrawlSettings;
use crate::crawler::dedup::ContentDeduplicator;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::{CancelHandle, Claim, Frontier, Take};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::output::{CrawlEvent, CrawlReport, CrawlSummary, EventSink, VisitOutcome};
use crate::robots::{HttpRobotsPolicy, RobotsPolicy};
use crate::state::VisitState;
use crate::url::{normalize_url, Classification};
use crate::CrawlError;
use chrono::Utc;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// How long an idle worker waits before polling the frontier again
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Progress is logged every this many visited pages
const PROGRESS_INTERVAL: u64 = 10;

/// Main crawler coordinator structure
pub struct Coordinator {
    settings: Arc<CrawlSettings>,
    frontier: Arc<Frontier>,
    dedup: Arc<ContentDeduplicator>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    robots: Option<Arc<dyn RobotsPolicy>>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Coordinator {
    /// Creates a coordinator with the HTTP fetcher, HTML extractor and (if
    /// enabled) robots.txt policy
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The HTTP client could not be built
    pub fn new(settings: CrawlSettings) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::from_settings(&settings)?;
        let extractor = HtmlLinkExtractor::new().map_err(|source| CrawlError::Parse {
            url: settings.seed.to_string(),
            source,
        })?;

        let robots: Option<Arc<dyn RobotsPolicy>> = if settings.respect_robots {
            Some(Arc::new(HttpRobotsPolicy::new(
                fetcher.client().clone(),
                settings.user_agent.crawler_name.clone(),
            )))
        } else {
            None
        };

        let coordinator =
            Self::with_collaborators(settings, Arc::new(fetcher), Arc::new(extractor));
        Ok(match robots {
            Some(policy) => coordinator.with_robots(policy),
            None => coordinator,
        })
    }

    /// Creates a coordinator with caller-supplied collaborators and no robots policy
    pub fn with_collaborators(
        settings: CrawlSettings,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            frontier: Arc::new(Frontier::new()),
            dedup: Arc::new(ContentDeduplicator::new()),
            fetcher,
            extractor,
            robots: None,
            sinks: Vec::new(),
        }
    }

    /// Consults `policy` before every fetch
    pub fn with_robots(mut self, policy: Arc<dyn RobotsPolicy>) -> Self {
        self.robots = Some(policy);
        self
    }

    /// Forwards every event to `sink` in addition to the summary report
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    /// Handle that cancels this crawl cooperatively
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(Arc::clone(&self.frontier))
    }

    /// Runs the crawl until the frontier drains or the crawl is cancelled
    ///
    /// The seed is classified like any discovered link and then offered with
    /// the configured seed priority. `max_workers` tasks then drain the
    /// frontier; a worker that panics is logged and counted, the rest keep
    /// going.
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        let started_at = Utc::now();
        let start = Instant::now();

        let ctx = Arc::new(CrawlContext {
            settings: Arc::clone(&self.settings),
            frontier: Arc::clone(&self.frontier),
            dedup: Arc::clone(&self.dedup),
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            robots: self.robots.clone(),
            report: CrawlReport::new(),
            sinks: self.sinks.clone(),
            start,
        });

        if self.robots.is_none() {
            tracing::warn!("robots.txt is not being consulted; every URL is presumed allowed");
        }

        let seed = self.settings.seed.clone();
        match self.settings.classifier.classify(&seed) {
            Classification::Eligible => {
                self.frontier.offer(seed, self.settings.seed_priority);
            }
            Classification::Excluded => ctx.emit(
                CrawlEvent::new(seed.as_str(), VisitOutcome::Excluded)
                    .with_detail("seed matches an exclusion pattern"),
            ),
            Classification::OffDomain => ctx.emit(
                CrawlEvent::new(seed.as_str(), VisitOutcome::Excluded)
                    .with_detail("seed is outside the base domain"),
            ),
        }

        tracing::info!(
            "Starting crawl of {} with {} workers",
            self.settings.base_domain(),
            self.settings.max_workers
        );

        let handles: Vec<_> = (0..self.settings.max_workers)
            .map(|id| tokio::spawn(worker_loop(id, Arc::clone(&ctx))))
            .collect();

        let mut worker_failures = 0;
        for (id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(visits)) => tracing::debug!("Worker {} finished after {} visits", id, visits),
                Ok(Err(e)) => {
                    tracing::error!("Worker {} failed: {}", id, e);
                    worker_failures += 1;
                }
                Err(e) => {
                    let message = if e.is_panic() {
                        panic_message(e.into_panic())
                    } else {
                        e.to_string()
                    };
                    tracing::error!("{}", CrawlError::WorkerPanicked { worker: id, message });
                    worker_failures += 1;
                }
            }
        }

        let elapsed = start.elapsed();
        let cancelled = self.frontier.is_cancelled();
        let summary = ctx.report.summarize(
            self.frontier.visited_snapshot(),
            started_at,
            Utc::now(),
            elapsed,
            worker_failures,
            cancelled,
        );

        tracing::info!(
            "Crawl {}: {} URLs claimed, {} visited, {} failed, {} duplicate in {:?}",
            if cancelled { "cancelled" } else { "completed" },
            summary.visited_set.len(),
            summary.total_visited,
            summary.total_failed,
            summary.total_duplicate,
            elapsed
        );

        Ok(summary)
    }
}

/// State shared by all workers of one run
struct CrawlContext {
    settings: Arc<CrawlSettings>,
    frontier: Arc<Frontier>,
    dedup: Arc<ContentDeduplicator>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    robots: Option<Arc<dyn RobotsPolicy>>,
    report: CrawlReport,
    sinks: Vec<Arc<dyn EventSink>>,
    start: Instant,
}

impl CrawlContext {
    /// Records an event in the report, logs it and forwards it to the sinks
    fn emit(&self, event: CrawlEvent) {
        // Repeated exclusions are dropped
        if !self.report.record(&event) {
            return;
        }

        let detail = event.detail.as_deref().unwrap_or("");
        match event.outcome {
            VisitOutcome::Visited => tracing::info!("{} {}", event.outcome, event.url),
            VisitOutcome::FetchFailed => {
                tracing::warn!("{} {} ({})", event.outcome, event.url, detail)
            }
            VisitOutcome::DuplicateContent | VisitOutcome::Excluded => {
                tracing::debug!("{} {} {}", event.outcome, event.url, detail)
            }
        }

        for sink in &self.sinks {
            sink.record(&event);
        }

        if event.outcome == VisitOutcome::Visited {
            let visited = self.report.visited_count();
            if visited % PROGRESS_INTERVAL == 0 {
                let elapsed = self.start.elapsed().as_secs_f64();
                let rate = if elapsed > 0.0 { visited as f64 / elapsed } else { 0.0 };
                tracing::info!(
                    "Progress: {} pages visited, {} in frontier, {:.2} pages/sec",
                    visited,
                    self.frontier.len(),
                    rate
                );
            }
        }
    }

    /// Drives one claimed URL from `Pending` to `Done`
    async fn visit(
        &self,
        worker: usize,
        claim: &Claim,
        last_fetch: &mut Option<Instant>,
    ) -> Result<(), CrawlError> {
        let url = claim.url();
        let mut visit = Visit::new(worker, url);

        let mut delay = self.settings.delay;
        if let Some(robots) = &self.robots {
            if !robots.is_allowed(url).await {
                self.emit(
                    CrawlEvent::new(url.as_str(), VisitOutcome::Excluded)
                        .with_detail("disallowed by robots.txt"),
                );
                return visit.advance(VisitState::Done);
            }
            if let Some(crawl_delay) = robots.crawl_delay(url).await {
                delay = delay.max(crawl_delay);
            }
        }

        if let Some(last) = *last_fetch {
            let elapsed = last.elapsed();
            if elapsed < delay {
                tokio::time::sleep(delay - elapsed).await;
            }
        }

        visit.advance(VisitState::Fetching)?;
        let result = self.fetcher.fetch(url).await;
        *last_fetch = Some(Instant::now());

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                visit.advance(VisitState::FetchFailed)?;
                self.emit(
                    CrawlEvent::new(url.as_str(), VisitOutcome::FetchFailed).with_detail(e.to_string()),
                );
                return visit.advance(VisitState::Done);
            }
        };
        visit.advance(VisitState::Fetched)?;

        if page.final_url != *url {
            match normalize_url(page.final_url.as_str()) {
                Ok(final_url) if self.settings.classifier.is_same_domain(&final_url) => {
                    tracing::debug!("{} redirected to {}", url, final_url);
                    self.frontier.mark_visited(&final_url);
                }
                _ => tracing::debug!("{} redirected off-domain to {}", url, page.final_url),
            }
        }

        if !self.dedup.check_and_record(&page.body) {
            visit.advance(VisitState::DuplicateContent)?;
            self.emit(CrawlEvent::new(url.as_str(), VisitOutcome::DuplicateContent));
            return visit.advance(VisitState::Done);
        }

        self.emit(CrawlEvent::new(url.as_str(), VisitOutcome::Visited));

        let links = match self.extractor.extract_links(&page.body, &page.final_url) {
            Ok(links) => links,
            Err(source) => {
                let e = CrawlError::Parse {
                    url: url.to_string(),
                    source,
                };
                tracing::warn!("{}", e);
                Vec::new()
            }
        };
        visit.advance(VisitState::Parsed)?;

        let priority = self.settings.classifier.priority_of(url);
        let mut added = 0;
        for link in &links {
            let candidate = match normalize_url(link) {
                Ok(u) => u,
                Err(e) => {
                    tracing::debug!("Skipping link {}: {}", link, e);
                    continue;
                }
            };

            match self.settings.classifier.classify(&candidate) {
                Classification::Eligible => {
                    if self.frontier.offer(candidate, priority) {
                        added += 1;
                    }
                }
                Classification::OffDomain => {
                    tracing::trace!("Ignoring off-domain link {}", candidate);
                }
                Classification::Excluded => self.emit(
                    CrawlEvent::new(candidate.as_str(), VisitOutcome::Excluded)
                        .with_detail("matched exclusion pattern"),
                ),
            }
        }
        visit.advance(VisitState::Extracted)?;

        tracing::debug!(
            "{}: {} links found, {} new (priority {})",
            url,
            links.len(),
            added,
            priority
        );
        visit.advance(VisitState::Done)
    }
}

/// Tracks the state of one URL visit and enforces legal transitions
struct Visit<'a> {
    worker: usize,
    url: &'a Url,
    state: VisitState,
}

impl<'a> Visit<'a> {
    fn new(worker: usize, url: &'a Url) -> Self {
        Self {
            worker,
            url,
            state: VisitState::Pending,
        }
    }

    fn advance(&mut self, next: VisitState) -> Result<(), CrawlError> {
        if !self.state.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("[worker {}] {}: {} -> {}", self.worker, self.url, self.state, next);
        self.state = next;
        Ok(())
    }
}

/// One worker: take, visit, repeat until the frontier drains
async fn worker_loop(id: usize, ctx: Arc<CrawlContext>) -> Result<u64, CrawlError> {
    let mut last_fetch: Option<Instant> = None;
    let mut visits = 0;

    loop {
        let claim = match ctx.frontier.take() {
            Take::Claimed(claim) => claim,
            Take::Idle => {
                ctx.frontier.wait_for_work(IDLE_POLL).await;
                continue;
            }
            Take::Drained => break,
        };

        ctx.visit(id, &claim, &mut last_fetch).await?;
        visits += 1;
    }

    Ok(visits)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Ordering, concurrency and termination tests over in-memory link graphs

use crate::common::{create_test_config, create_test_settings, GraphFetcher};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use sumi_trawl::config::{CrawlSettings, PriorityEntry};
use sumi_trawl::crawler::{Coordinator, HtmlLinkExtractor};
use sumi_trawl::output::{ChannelSink, CrawlSummary, VisitOutcome};

const SEED: &str = "https://example.com/";

fn coordinator(settings: CrawlSettings, fetcher: Arc<GraphFetcher>) -> Coordinator {
    Coordinator::with_collaborators(settings, fetcher, Arc::new(HtmlLinkExtractor::new().unwrap()))
}

async fn crawl(settings: CrawlSettings, fetcher: Arc<GraphFetcher>) -> CrawlSummary {
    coordinator(settings, fetcher).run().await.unwrap()
}

/// A site with fan-out, back links, cross links, excluded and external links
fn mesh() -> GraphFetcher {
    let mut fetcher = GraphFetcher::new().page(
        "/",
        &["/s0", "/s1", "/s2", "/s3", "/login", "https://external.com/"],
    );
    for s in 0..4 {
        let children: Vec<String> = (0..6).map(|c| format!("/s{}/p{}", s, c)).collect();
        let mut links: Vec<&str> = children.iter().map(String::as_str).collect();
        links.push("/");
        fetcher = fetcher.page(&format!("/s{}", s), &links);

        for c in 0..6 {
            let next = format!("/s{}/p{}", (s + 1) % 4, (c + 1) % 6);
            let back = format!("/s{}", s);
            fetcher = fetcher.page(
                &format!("/s{}/p{}", s, c),
                &[next.as_str(), back.as_str(), "/login?next=/", "https://sub.example.com/x"],
            );
        }
    }
    fetcher
}

fn mesh_settings(workers: u32) -> CrawlSettings {
    let mut config = create_test_config(SEED, workers);
    config.crawler.exclude_patterns = vec!["login".to_string()];
    CrawlSettings::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_worker_count_does_not_change_visited_set() {
    let mut results = Vec::new();
    for workers in [1, 4, 16] {
        let fetcher = Arc::new(mesh());
        let summary = crawl(mesh_settings(workers), fetcher.clone()).await;

        // Every page fetched exactly once
        let mut counts: HashMap<String, usize> = HashMap::new();
        for path in fetcher.fetched() {
            *counts.entry(path).or_default() += 1;
        }
        assert!(counts.values().all(|&n| n == 1), "duplicate fetch with {} workers", workers);

        assert!(summary.is_clean());
        assert_eq!(summary.total_failed, 0);
        results.push(summary.visited_set);
    }

    // 1 root + 4 sections + 24 leaves
    assert_eq!(results[0].len(), 29);
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0], results[2]);
}

#[tokio::test]
async fn test_no_off_domain_or_excluded_urls_visited() {
    let summary = crawl(mesh_settings(4), Arc::new(mesh())).await;

    for url in &summary.visited_set {
        assert!(url.starts_with("https://example.com/"), "off-domain: {}", url);
        assert!(!url.contains("login"), "excluded: {}", url);
    }
    // "/login" and "/login?next=/" are reported once each
    assert_eq!(
        summary.excluded,
        vec![
            "https://example.com/login".to_string(),
            "https://example.com/login?next=%2F".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_cycle_terminates_and_visits_each_once() {
    let fetcher = Arc::new(
        GraphFetcher::new()
            .page("/", &["/a"])
            .page("/a", &["/b"])
            .page("/b", &["/a"]),
    );

    let summary = tokio::time::timeout(
        Duration::from_secs(10),
        crawl(create_test_settings(SEED, 4), fetcher.clone()),
    )
    .await
    .expect("crawl did not terminate");

    assert_eq!(fetcher.fetched().iter().filter(|p| *p == "/a").count(), 1);
    assert_eq!(fetcher.fetched().iter().filter(|p| *p == "/b").count(), 1);
    assert_eq!(summary.total_visited, 3);
}

#[tokio::test]
async fn test_single_worker_visits_fifo_by_priority() {
    let fetcher = Arc::new(
        GraphFetcher::new()
            .page("/", &["/a", "/b", "/c"])
            .page("/a", &["/a1"])
            .page("/b", &["/b1"])
            .page("/c", &[])
            .page("/a1", &[])
            .page("/b1", &[]),
    );

    crawl(create_test_settings(SEED, 1), fetcher.clone()).await;

    assert_eq!(fetcher.fetched(), vec!["/", "/a", "/b", "/c", "/a1", "/b1"]);
}

#[tokio::test]
async fn test_priority_rule_promotes_links_of_matching_pages() {
    let fetcher = Arc::new(
        GraphFetcher::new()
            .page("/", &["/x", "/index"])
            .page("/x", &["/x1"])
            .page("/index", &["/i1"])
            .page("/x1", &[])
            .page("/i1", &[]),
    );

    let mut config = create_test_config(SEED, 1);
    config.priority = vec![PriorityEntry {
        pattern: "/index$".to_string(),
        score: 1,
    }];
    let settings = CrawlSettings::from_config(&config).unwrap();

    crawl(settings, fetcher.clone()).await;

    assert_eq!(fetcher.fetched(), vec!["/", "/x", "/index", "/i1", "/x1"]);
}

#[tokio::test]
async fn test_canonical_link_keeps_document_position() {
    let fetcher = Arc::new(
        GraphFetcher::new()
            .raw(
                "/",
                r#"<html><head><link rel="canonical" href="/home"></head>
                <body><a href="/a">a</a><a href="/b">b</a></body></html>"#,
            )
            .page("/home", &[])
            .page("/a", &[])
            .page("/b", &[]),
    );

    crawl(create_test_settings(SEED, 1), fetcher.clone()).await;

    assert_eq!(fetcher.fetched(), vec!["/", "/home", "/a", "/b"]);
}

#[tokio::test]
async fn test_politeness_delay_is_per_worker() {
    const WORKERS: usize = 4;
    const PAGES: usize = 12;
    let delay = Duration::from_millis(200);

    let leaves: Vec<String> = (1..PAGES).map(|i| format!("/leaf{}", i)).collect();
    let links: Vec<&str> = leaves.iter().map(String::as_str).collect();
    let mut fetcher = GraphFetcher::new().page("/", &links);
    for leaf in &leaves {
        fetcher = fetcher.page(leaf, &[]);
    }
    let fetcher = Arc::new(fetcher);

    let mut config = create_test_config(SEED, WORKERS as u32);
    config.crawler.delay_seconds = delay.as_secs_f64();
    let summary = crawl(CrawlSettings::from_config(&config).unwrap(), fetcher.clone()).await;

    assert_eq!(summary.total_visited, PAGES as u64);

    // Any WORKERS + 1 consecutive fetches include two by the same worker,
    // so they must span at least one delay
    let times = fetcher.fetch_times();
    assert_eq!(times.len(), PAGES);
    for window in times.windows(WORKERS + 1) {
        assert!(
            window[WORKERS].duration_since(window[0]) >= delay,
            "more than {} fetches within one delay",
            WORKERS
        );
    }

    // A single global pacer would need (PAGES - 1) delays
    let serialized = delay * (PAGES as u32 - 1);
    assert!(
        summary.elapsed < serialized / 2,
        "elapsed {:?}, serialized pacing would take {:?}",
        summary.elapsed,
        serialized
    );
}

#[tokio::test]
async fn test_duplicate_content_is_not_expanded() {
    let body = r#"<html><body><a href="/only-from-copy">x</a></body></html>"#;
    let fetcher = Arc::new(
        GraphFetcher::new()
            .page("/", &["/original", "/copy"])
            .raw("/original", body)
            .raw("/copy", body)
            .page("/only-from-copy", &[]),
    );

    let summary = crawl(create_test_settings(SEED, 1), fetcher.clone()).await;

    assert_eq!(summary.total_duplicate, 1);
    // The first copy was visited and its link followed exactly once
    assert_eq!(summary.total_visited, 3);
    assert!(summary
        .visited_set
        .contains("https://example.com/only-from-copy"));
}

#[tokio::test]
async fn test_fetch_failures_are_reported_and_skipped() {
    let fetcher = Arc::new(
        GraphFetcher::new()
            .page("/", &["/missing", "/ok"])
            .page("/ok", &[]),
    );

    let summary = crawl(create_test_settings(SEED, 2), fetcher).await;

    assert_eq!(summary.total_visited, 2);
    assert_eq!(summary.total_failed, 1);
    assert_eq!(
        summary.failures,
        vec![("https://example.com/missing".to_string(), "HTTP 404".to_string())]
    );
    assert!(summary.visited_set.contains("https://example.com/missing"));
}

#[tokio::test]
async fn test_event_stream() {
    let fetcher = Arc::new(
        GraphFetcher::new()
            .page("/", &["/a", "/login", "/gone"])
            .page("/a", &["/login"]),
    );
    let mut config = create_test_config(SEED, 1);
    config.crawler.exclude_patterns = vec!["login".to_string()];
    let settings = CrawlSettings::from_config(&config).unwrap();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    coordinator(settings, fetcher)
        .with_sink(Arc::new(ChannelSink::new(tx)))
        .run()
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push((event.url, event.outcome));
    }

    assert_eq!(
        events,
        vec![
            ("https://example.com/".to_string(), VisitOutcome::Visited),
            ("https://example.com/login".to_string(), VisitOutcome::Excluded),
            ("https://example.com/a".to_string(), VisitOutcome::Visited),
            ("https://example.com/gone".to_string(), VisitOutcome::FetchFailed),
        ]
    );
}

#[tokio::test]
async fn test_cancellation_stops_crawl() {
    // A long chain: each page only links to the next
    let mut fetcher = GraphFetcher::new().latency(Duration::from_millis(10));
    fetcher = fetcher.page("/", &["/p1"]);
    for i in 1..200 {
        fetcher = fetcher.page(&format!("/p{}", i), &[format!("/p{}", i + 1).as_str()]);
    }
    let fetcher = Arc::new(fetcher);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let coordinator = coordinator(create_test_settings(SEED, 2), fetcher.clone())
        .with_sink(Arc::new(ChannelSink::new(tx)));
    let cancel = coordinator.cancel_handle();

    tokio::spawn(async move {
        // Cancel as soon as the first page is visited
        if rx.recv().await.is_some() {
            cancel.cancel();
        }
    });

    let summary = tokio::time::timeout(Duration::from_secs(10), coordinator.run())
        .await
        .expect("cancelled crawl did not finish")
        .unwrap();

    assert!(summary.cancelled);
    assert!(summary.visited_set.len() < 10);
    assert!(fetcher.fetched().len() < 10);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_visited_set_is_result_artifact() {
    let fetcher = Arc::new(GraphFetcher::new().page("/", &["/a?b=2&a=1#frag"]).page("/a", &[]));

    let summary = crawl(create_test_settings(SEED, 1), fetcher).await;

    let expected: BTreeSet<String> = ["https://example.com/", "https://example.com/a?a=1&b=2"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(summary.visited_set, expected);
}

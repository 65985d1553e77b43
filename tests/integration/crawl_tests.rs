//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crate::common::create_test_config;
use std::collections::BTreeSet;
use std::time::Duration;
use sumi_trawl::config::{Config, CrawlSettings};
use sumi_trawl::crawler::{Coordinator, Fetcher, HttpFetcher};
use sumi_trawl::output::CrawlSummary;
use sumi_trawl::robots::{HttpRobotsPolicy, RobotsPolicy, MAX_CRAWL_DELAY_SECS};
use sumi_trawl::FetchError;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: impl Into<String>) -> ResponseTemplate {
    let body: String = body.into();
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn run(config: Config) -> CrawlSummary {
    let settings = CrawlSettings::from_config(&config).unwrap();
    Coordinator::new(settings).unwrap().run().await.unwrap()
}

fn set(urls: &[String]) -> BTreeSet<String> {
    urls.iter().cloned().collect()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="/about">About</a>
            <a href="{}/contact">Contact</a>
            <a href="https://external.com">External</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(&mock_server, "/about", "<html><body>About us</body></html>").await;
    mount_page(&mock_server, "/contact", "<html><body>Contact us</body></html>").await;

    let summary = run(create_test_config(&format!("{}/", base_url), 2)).await;

    assert_eq!(
        summary.visited_set,
        set(&[
            format!("{}/", base_url),
            format!("{}/about", base_url),
            format!("{}/contact", base_url),
        ])
    );
    assert_eq!(summary.total_visited, 3);
    assert_eq!(summary.total_failed, 0);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_excluded_link_never_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/login">Log in</a><a href="/docs">Docs</a>"#,
    )
    .await;
    mount_page(&mock_server, "/docs", r#"<a href="/login">Log in</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html("login form"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&format!("{}/", base_url), 1);
    config.crawler.exclude_patterns = vec!["login".to_string()];
    let summary = run(config).await;

    assert!(!summary.visited_set.contains(&format!("{}/login", base_url)));
    assert_eq!(summary.total_excluded, 1);
    assert_eq!(summary.total_visited, 2);
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/private/page">Private</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&mock_server, "/public", "<p>public</p>").await;
    Mock::given(method("GET"))
        .and(path("/private/page"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&format!("{}/", base_url), 1);
    config.robots.respect = true;
    let summary = run(config).await;

    assert_eq!(summary.total_visited, 2);
    assert_eq!(summary.excluded, vec![format!("{}/private/page", base_url)]);
}

#[tokio::test]
async fn test_missing_robots_txt_allows_all() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // No robots.txt mock: wiremock answers 404
    mount_page(&mock_server, "/", r#"<a href="/page">Page</a>"#).await;
    mount_page(&mock_server, "/page", "<p>page</p>").await;

    let mut config = create_test_config(&format!("{}/", base_url), 1);
    config.robots.respect = true;
    let summary = run(config).await;

    assert_eq!(summary.total_visited, 2);
    assert_eq!(summary.total_excluded, 0);
}

#[tokio::test]
async fn test_oversized_crawl_delay_is_clamped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 1e20\n"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", "<p>only page</p>").await;

    let seed = Url::parse(&format!("{}/", base_url)).unwrap();
    let policy = HttpRobotsPolicy::new(reqwest::Client::new(), "TestBot");
    assert_eq!(
        policy.crawl_delay(&seed).await,
        Some(Duration::from_secs_f64(MAX_CRAWL_DELAY_SECS))
    );

    let mut config = create_test_config(seed.as_str(), 4);
    config.robots.respect = true;
    let summary = run(config).await;

    assert_eq!(summary.total_visited, 1);
    assert_eq!(summary.worker_failures, 0);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_content_type_and_status_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/doc.pdf">PDF</a><a href="/broken">Broken</a><a href="/missing">Missing</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x25, 0x50, 0x44, 0x46], "application/pdf"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let summary = run(create_test_config(&format!("{}/", base_url), 1)).await;

    assert_eq!(summary.total_visited, 1);
    assert_eq!(summary.total_failed, 3);
    assert_eq!(
        summary.failures,
        vec![
            (
                format!("{}/doc.pdf", base_url),
                "Expected HTML, got application/pdf".to_string()
            ),
            (format!("{}/broken", base_url), "HTTP 500".to_string()),
            (format!("{}/missing", base_url), "HTTP 404".to_string()),
        ]
    );
    // Failed URLs are still claimed
    assert_eq!(summary.visited_set.len(), 4);
}

#[tokio::test]
async fn test_duplicate_content_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&mock_server, "/a", "<p>same</p>").await;
    mount_page(&mock_server, "/b", "<p>same</p>").await;

    let summary = run(create_test_config(&format!("{}/", base_url), 1)).await;

    assert_eq!(summary.total_visited, 2);
    assert_eq!(summary.total_duplicate, 1);
}

#[tokio::test]
async fn test_redirect_target_not_refetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/old">Old</a><a href="/new">New</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("<p>new home</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = run(create_test_config(&format!("{}/", base_url), 1)).await;

    assert_eq!(summary.total_visited, 2);
    assert_eq!(summary.total_duplicate, 0);
    assert!(summary.visited_set.contains(&format!("{}/new", base_url)));
}

#[tokio::test]
async fn test_politeness_delay_paces_worker() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&mock_server, "/a", "<p>a</p>").await;
    mount_page(&mock_server, "/b", "<p>b</p>").await;

    let mut config = create_test_config(&format!("{}/", base_url), 1);
    config.crawler.delay_seconds = 0.2;
    let summary = run(config).await;

    assert_eq!(summary.total_visited, 3);
    // Two gaps between three fetches
    assert!(summary.elapsed >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_fetcher_retries_transient_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/flaky", "<p>recovered</p>").await;

    let url = Url::parse(&format!("{}/flaky", mock_server.uri())).unwrap();
    let fetcher = HttpFetcher::new(reqwest::Client::new()).with_retries(2, Duration::from_millis(10));

    let page = fetcher.fetch(&url).await.unwrap();
    assert_eq!(page.status, 200);
    assert_eq!(page.body, b"<p>recovered</p>");
    assert_eq!(page.content_type, "text/html");
}

#[tokio::test]
async fn test_fetcher_does_not_retry_client_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/gone", mock_server.uri())).unwrap();
    let fetcher = HttpFetcher::new(reqwest::Client::new()).with_retries(3, Duration::from_millis(10));

    assert_eq!(fetcher.fetch(&url).await.unwrap_err(), FetchError::Status(410));
}

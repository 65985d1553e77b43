//! Config file to finished crawl

use std::io::Write;
use sumi_trawl::config::{load_config_with_hash, CrawlSettings};
use sumi_trawl::crawler::crawl;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_crawl_from_config_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/signup">Join</a><a href="/blog">Blog</a>"#, "text/html"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>posts</p>", "text/html"))
        .mount(&mock_server)
        .await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[crawler]
seed-url = "{}/"
exclude-patterns = ["signup"]
max-workers = 3
delay-seconds = 0.0

[[priority]]
pattern = "/blog"
score = 1

[user-agent]
crawler-name = "TestBot"
crawler-version = "0.1.0"
contact-url = "https://example.com/bot"
contact-email = "bot@example.com"

[robots]
respect = false
"#,
        base_url
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(file.path()).unwrap();
    assert_eq!(hash.len(), 64);

    let settings = CrawlSettings::from_config(&config).unwrap();
    assert_eq!(settings.max_workers, 3);
    assert_eq!(settings.base_domain(), "127.0.0.1");

    let summary = crawl(settings).await.unwrap();
    assert_eq!(summary.total_visited, 2);
    assert_eq!(summary.excluded, vec![format!("{}/signup", base_url)]);
}

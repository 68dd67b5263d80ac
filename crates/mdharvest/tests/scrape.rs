//! End-to-end scrape tests using wiremock

use mdharvest::{BatchPolicy, ScrapeOptions, Scraper, MANIFEST_FILENAME};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(format!("<html><body>{body}</body></html>"), "text/html")
}

fn text_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/plain")
}

async fn mount_seed(server: &MockServer, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{l}">{l}</a>"#))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&anchors))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_small_pages_collapse_into_one_batch() {
    let server = MockServer::start().await;
    mount_seed(&server, &["/a", "/b", "/c"]).await;
    for p in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(text_page(&"x".repeat(200)))
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let options = ScrapeOptions::new(dir.path());
    let summary = Scraper::new(options)
        .run(&[format!("{}/", server.uri())])
        .await
        .unwrap();

    // Seed page plus three links, all tiny: exactly one trailing batch.
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.batches, 1);
    assert_eq!(summary.standalones, 0);

    assert!(dir.path().join("batch_01.md").exists());
    let manifest = std::fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap();
    assert!(manifest.contains("**Total units:** 1"));
    assert!(manifest.contains("batch_01.md"));
    assert!(manifest.contains(&format!("{}/a", server.uri())));
}

#[tokio::test]
async fn test_oversized_page_becomes_individual_file() {
    let server = MockServer::start().await;
    mount_seed(&server, &["/small", "/big"]).await;
    Mock::given(method("GET"))
        .and(path("/small"))
        .respond_with(text_page("a little content"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(text_page(&"y".repeat(20_000)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = ScrapeOptions::new(dir.path())
        .policy(BatchPolicy::default().max_chars(10_000).min_chars(500));
    let summary = Scraper::new(options)
        .run(&[format!("{}/", server.uri())])
        .await
        .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.standalones, 1);
    assert_eq!(summary.batches, 1);

    assert!(dir.path().join("INDIVIDUAL_big.md").exists());
    let body = std::fs::read_to_string(dir.path().join("INDIVIDUAL_big.md")).unwrap();
    assert!(body.contains(&format!("**Source:** {}/big", server.uri())));

    let manifest = std::fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap();
    assert!(manifest.contains("**Total units:** 2"));
    assert!(manifest.contains("INDIVIDUAL_big.md** (individual)"));
}

#[tokio::test]
async fn test_failed_conversions_are_skipped_not_fatal() {
    let server = MockServer::start().await;
    let links: Vec<String> = (1..=9).map(|i| format!("/p{i}")).collect();
    let link_refs: Vec<&str> = links.iter().map(|s| s.as_str()).collect();
    mount_seed(&server, &link_refs).await;

    for (i, p) in links.iter().enumerate() {
        let responder = if i >= 7 {
            ResponseTemplate::new(500)
        } else {
            text_page(&format!("content of page {i}"))
        };
        Mock::given(method("GET"))
            .and(path(p.as_str()))
            .respond_with(responder)
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let summary = Scraper::new(ScrapeOptions::new(dir.path()))
        .run(&[format!("{}/", server.uri())])
        .await
        .unwrap();

    // Seed + 7 good pages processed, 2 server errors skipped.
    assert_eq!(summary.processed, 8);
    assert_eq!(summary.failed, 2);

    let manifest = std::fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap();
    let source_count = manifest.matches("   - http").count();
    assert_eq!(source_count, 8);
    assert!(!manifest.contains("/p8"));
    assert!(!manifest.contains("/p9"));
}

#[tokio::test]
async fn test_off_domain_links_are_not_crawled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/local">here</a><a href="https://elsewhere.example/x">away</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/local"))
        .respond_with(text_page("local content"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let summary = Scraper::new(ScrapeOptions::new(dir.path()))
        .run(&[format!("{}/", server.uri())])
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    let manifest = std::fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap();
    assert!(!manifest.contains("elsewhere.example"));
}

#[tokio::test]
async fn test_page_cap_bounds_the_run() {
    let server = MockServer::start().await;
    let links: Vec<String> = (1..=8).map(|i| format!("/l{i}")).collect();
    let link_refs: Vec<&str> = links.iter().map(|s| s.as_str()).collect();
    mount_seed(&server, &link_refs).await;
    for p in &links {
        Mock::given(method("GET"))
            .and(path(p.as_str()))
            .respond_with(text_page("capped page"))
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let summary = Scraper::new(ScrapeOptions::new(dir.path()).max_pages(3))
        .run(&[format!("{}/", server.uri())])
        .await
        .unwrap();

    // Seed plus the first two discovered links.
    assert_eq!(summary.processed + summary.failed, 3);
}

#[tokio::test]
async fn test_unreachable_seed_degrades_to_nothing_extracted() {
    // Nothing listens on port 1; discovery and conversion both fail fast.
    let dir = tempfile::tempdir().unwrap();
    let summary = Scraper::new(ScrapeOptions::new(dir.path()))
        .run(&["http://127.0.0.1:1/".to_string()])
        .await
        .unwrap();

    assert!(summary.nothing_extracted());
    assert_eq!(summary.failed, 1);
    assert!(summary.manifest.is_none());
    assert!(!dir.path().join(MANIFEST_FILENAME).exists());
}

#[tokio::test]
async fn test_rerun_never_overwrites_prior_output() {
    let server = MockServer::start().await;
    mount_seed(&server, &["/a"]).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(text_page("stable content"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let seeds = [format!("{}/", server.uri())];

    Scraper::new(ScrapeOptions::new(dir.path()))
        .run(&seeds)
        .await
        .unwrap();
    let first = std::fs::read_to_string(dir.path().join("batch_01.md")).unwrap();

    Scraper::new(ScrapeOptions::new(dir.path()))
        .run(&seeds)
        .await
        .unwrap();

    // First run's batch untouched, second run suffixed.
    assert_eq!(
        std::fs::read_to_string(dir.path().join("batch_01.md")).unwrap(),
        first
    );
    assert!(dir.path().join("batch_01_01.md").exists());
}

#[tokio::test]
async fn test_invalid_seed_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = Scraper::new(ScrapeOptions::new(dir.path()))
        .run(&["ftp://example.org/".to_string()])
        .await;
    assert!(result.is_err());
}

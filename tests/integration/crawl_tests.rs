//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use depth_crawl::config::{parse_config, CrawlConfig, HttpConfig, LinkRule, Overrides, SelectorPolicy};
use depth_crawl::crawler::{Controller, HttpFetcher};
use depth_crawl::extract::{build_handler, DummyHandler};
use depth_crawl::output::load_statistics;
use depth_crawl::storage::{open_store, RecordKind, SharedStore};
use depth_crawl::ConfigError;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PAGE: &str = include_str!("../fixtures/listing_page.html");
const QUESTION_PAGE: &str = include_str!("../fixtures/question_page.html");
const ANSWER_PAGE: &str = include_str!("../fixtures/answer_page.html");

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn fetcher() -> Arc<HttpFetcher> {
    let http = HttpConfig {
        timeout_secs: 5,
        ..Default::default()
    };
    Arc::new(HttpFetcher::new(&http).expect("Failed to build HTTP client"))
}

fn item_policy() -> SelectorPolicy {
    SelectorPolicy::new()
        .with_rule(0, LinkRule::Class("item".to_string()))
        .expect("Failed to compile rule")
}

fn record_counts(store: &SharedStore) -> Vec<u64> {
    let store = store.lock().unwrap();
    let stats = load_statistics(&*store).unwrap();
    RecordKind::ALL.iter().map(|kind| stats.count(*kind)).collect()
}

#[tokio::test]
async fn test_listing_crawl_emits_children() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/list",
        r#"<html><body>
            <a class="item" href="/a">A</a>
            <a class="item" href="b">B</a>
            <a class="nav" href="/next">Next</a>
        </body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/a", "<html><head><title>A</title></head></html>").await;
    mount_page(&mock_server, "/b", "<html><head><title>B</title></head></html>").await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<p>never</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let handler = Arc::new(DummyHandler::new());
    let config = CrawlConfig::new(2).with_policy(item_policy());
    let report = Controller::new(config, fetcher())
        .with_handler(handler.clone())
        .run(&[format!("{}/list", base_url)])
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_emitted, 2);
    assert_eq!(report.pages_extracted, 2);
    assert_eq!(handler.handled(), 2);
    assert_eq!(
        report.visited,
        vec![
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/list", base_url),
        ]
    );
}

#[tokio::test]
async fn test_fragment_aliases_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/list",
        r##"<a href="/x#top">top</a> <a href="/x#bottom">bottom</a>"##,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html("<p>x</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = CrawlConfig::new(2).with_workers(4, 0);
    let report = Controller::new(config, fetcher())
        .run(&[format!("{}/list", base_url)])
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.duplicates_skipped, 1);
}

#[tokio::test]
async fn test_failing_child_is_contained() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/list",
        r#"<a href="/a">a</a> <a href="/broken">broken</a> <a href="/c">c</a>"#,
    )
    .await;
    mount_page(&mock_server, "/a", "<p>a</p>").await;
    mount_page(&mock_server, "/c", "<p>c</p>").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let handler = Arc::new(DummyHandler::new());
    let report = Controller::new(CrawlConfig::new(2), fetcher())
        .with_handler(handler.clone())
        .run(&[format!("{}/list", base_url)])
        .await
        .expect("Crawl failed");

    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(handler.handled(), 2);
}

#[tokio::test]
async fn test_non_document_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/list",
        r#"<a href="/report.pdf">pdf</a> <a href="/page">page</a>"#,
    )
    .await;
    mount_page(&mock_server, "/page", "<p>page</p>").await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .mount(&mock_server)
        .await;

    let report = Controller::new(CrawlConfig::new(2), fetcher())
        .run(&[format!("{}/list", base_url)])
        .await
        .expect("Crawl failed");

    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_latin1_page_is_extracted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cafe"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"<html><head><title>Caf\xE9</title></head></html>".to_vec(),
            "text/html; charset=iso-8859-1",
        ))
        .mount(&mock_server)
        .await;

    let handler = Arc::new(DummyHandler::new());
    let report = Controller::new(CrawlConfig::new(1), fetcher())
        .with_handler(handler.clone())
        .run(&[format!("{}/cafe", mock_server.uri())])
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.malformed_documents, 0);
    assert_eq!(report.pages_emitted, 1);
    assert_eq!(report.pages_extracted, 1);
    assert_eq!(handler.handled(), 1);
}

/// Mounts a one-question StackExchange site: listing, question page, second answer page
async fn mount_stackexchange(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/questions"))
        .and(query_param("page", "1"))
        .respond_with(html(LISTING_PAGE))
        .mount(server)
        .await;
    mount_page(server, "/questions/100/how-to-borrow", QUESTION_PAGE).await;
    mount_page(server, "/questions/100/how-to-borrow/answers-2", ANSWER_PAGE).await;
}

async fn run_stackexchange(base_url: &str, store: SharedStore, db: &str) -> depth_crawl::CrawlReport {
    let toml = format!(
        r#"
[crawler]
fetch-workers = 3
dispatch-workers = 2

[http]
timeout-secs = 5

[source]
url-template = "{}/questions?page={{page}}&sort=newest"
start-page = 1
end-page = 1
profile = "stackexchange"
"#,
        base_url
    );

    let mut config = parse_config(&toml).expect("Failed to parse config");
    config.apply(&Overrides {
        database_path: Some(db.to_string()),
        ..Default::default()
    });
    let settings = config.resolve().expect("Failed to resolve settings");
    assert_eq!(settings.crawl.depth_limit, 3);

    let fetcher = Arc::new(HttpFetcher::new(&settings.http).expect("Failed to build HTTP client"));
    let handler = build_handler(settings.profile, store);
    Controller::new(settings.crawl, fetcher)
        .with_handler(handler)
        .run(&settings.seeds)
        .await
        .expect("Crawl failed")
}

#[tokio::test]
async fn test_stackexchange_crawl_into_sqlite() {
    let mock_server = MockServer::start().await;
    mount_stackexchange(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("records.db");
    let store = open_store(&db_path).expect("Failed to open store");

    let report = run_stackexchange(
        &mock_server.uri(),
        Arc::clone(&store),
        db_path.to_str().unwrap(),
    )
    .await;

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(report.pages_emitted, 2);
    assert_eq!(report.pages_extracted, 2);
    assert_eq!(report.extraction_failures, 0);

    // users: alice, bob, carol; answers 201, 202 and 301; comment 501
    assert_eq!(record_counts(&store), vec![3, 1, 3, 1]);
}

#[tokio::test]
async fn test_rerun_adds_no_records() {
    let mock_server = MockServer::start().await;
    mount_stackexchange(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("records.db");
    let db = db_path.to_str().unwrap().to_string();

    let first_store = open_store(&db_path).expect("Failed to open store");
    run_stackexchange(&mock_server.uri(), Arc::clone(&first_store), &db).await;
    let first = record_counts(&first_store);
    drop(first_store);

    let second_store = open_store(&db_path).expect("Failed to reopen store");
    let report = run_stackexchange(&mock_server.uri(), Arc::clone(&second_store), &db).await;

    assert_eq!(report.pages_extracted, 2);
    assert_eq!(record_counts(&second_store), first);
}

#[test]
fn test_missing_template_is_reported() {
    let mut config = parse_config("").unwrap();
    config.apply(&Overrides {
        database_path: Some("records.db".to_string()),
        ..Default::default()
    });

    assert!(matches!(config.resolve(), Err(ConfigError::Missing(_))));
}

#[test]
fn test_relative_template_is_rejected() {
    let mut config = parse_config("[source]\nurl-template = \"/questions?page={page}\"\n").unwrap();
    config.apply(&Overrides {
        database_path: Some("records.db".to_string()),
        ..Default::default()
    });

    assert!(matches!(config.resolve(), Err(ConfigError::InvalidUrl(_))));
}

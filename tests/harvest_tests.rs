//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a paginated listing and drive the full
//! discover, crawl, aggregate and persist cycle end-to-end.

use page_harvest::config::{parse_config, Config};
use page_harvest::crawler::run_harvest;
use page_harvest::storage::{RunStatus, SqliteStorage, Storage};
use page_harvest::{CrawlError, DiscoveryError, HarvestError};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, reference_path: &str, destination: &Path, format: &str) -> Config {
    parse_config(&format!(
        r#"
[crawler]
concurrency-limit = 2
request-timeout-secs = 5

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"

[site]
reference-url = "{base}{reference}"
page-url-template = "{base}/facts?page={{page}}"

[output]
destination = {destination:?}
format = "{format}"
"#,
        base = base_url,
        reference = reference_path,
        destination = destination.display().to_string(),
        format = format,
    ))
    .expect("Failed to build test config")
}

fn pager(last: u32) -> String {
    format!(
        r#"<ul class="pager"><li class="pager-last last"><a href="/facts?page={}">last »</a></li></ul>"#,
        last
    )
}

fn listing(items: &[&str], extra: &str) -> String {
    let rows: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<div class="views-row"><p><span class="createYourOwn">{}</span></p></div>"#,
                item
            )
        })
        .collect();
    format!("<html><body>{}{}</body></html>", rows, extra)
}

async fn mount_page(server: &MockServer, page: u32, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/facts"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn mount_start(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_to_json() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.json");

    // Page 1 doubles as the reference page: fetched once for discovery, once for items
    mount_page(&mock_server, 1, listing(&["b", "a"], &pager(3)), 2).await;
    mount_page(&mock_server, 2, listing(&[], &pager(3)), 1).await;
    mount_page(&mock_server, 3, listing(&["a", "c"], &pager(3)), 1).await;

    let config = create_test_config(&mock_server.uri(), "/facts?page=1", &output, "json");
    let summary = run_harvest(&config, Some("hash".to_string()))
        .await
        .expect("Harvest should succeed");

    assert_eq!(summary.pages_attempted, 3);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.raw_items, 4);
    assert_eq!(summary.unique_items, 3);
    assert!(summary.output_written);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written, serde_json::json!({ "quotes": ["a", "b", "c"] }));
}

#[tokio::test]
async fn test_failed_page_is_tolerated() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.json");

    mount_start(&mock_server, listing(&[], &pager(2))).await;
    Mock::given(method("GET"))
        .and(path("/facts"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 2, listing(&["x"], ""), 1).await;

    let config = create_test_config(&mock_server.uri(), "/start", &output, "json");
    let summary = run_harvest(&config, None).await.expect("Harvest should succeed");

    assert_eq!(summary.pages_attempted, 2);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.failed_pages, vec![1]);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written, serde_json::json!({ "quotes": ["x"] }));
}

#[tokio::test]
async fn test_discovery_failure_aborts_run() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.json");

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    // No listing page may be requested
    Mock::given(method("GET"))
        .and(path("/facts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "/start", &output, "json");
    let err = run_harvest(&config, None).await.unwrap_err();

    assert!(matches!(err, HarvestError::Discovery(DiscoveryError::Fetch(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_pager_aborts_run() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.json");

    mount_start(&mock_server, listing(&["a"], "")).await;

    let config = create_test_config(&mock_server.uri(), "/start", &output, "json");
    let err = run_harvest(&config, None).await.unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Discovery(DiscoveryError::MarkerNotFound { .. })
    ));
}

#[tokio::test]
async fn test_all_pages_failed_aborts_run() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.json");

    // Listing pages are not mounted and answer 404
    mount_start(&mock_server, listing(&[], &pager(3))).await;

    let config = create_test_config(&mock_server.uri(), "/start", &output, "json");
    let err = run_harvest(&config, None).await.unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Crawl(CrawlError::AllPagesFailed { attempted: 3 })
    ));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_harvest_to_sqlite() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.db");

    mount_start(&mock_server, listing(&[], &pager(2))).await;
    mount_page(&mock_server, 1, listing(&["gamma", "alpha"], ""), 1).await;
    mount_page(&mock_server, 2, listing(&["beta", "alpha"], ""), 1).await;

    let config = create_test_config(&mock_server.uri(), "/start", &output, "sqlite");
    let summary = run_harvest(&config, Some("cfg-hash".to_string()))
        .await
        .expect("Harvest should succeed");
    assert_eq!(summary.unique_items, 3);

    let storage = SqliteStorage::new(&output).unwrap();
    let run = storage.get_latest_run().unwrap().expect("Run should be recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "cfg-hash");
    assert_eq!(run.item_count, Some(3));
    assert_eq!(
        storage.load_items(run.id).unwrap(),
        vec!["alpha", "beta", "gamma"]
    );
}

#[tokio::test]
async fn test_empty_harvest_writes_nothing() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.json");

    mount_start(&mock_server, listing(&[], &pager(2))).await;
    mount_page(&mock_server, 1, listing(&[], ""), 1).await;
    mount_page(&mock_server, 2, listing(&[], ""), 1).await;

    let config = create_test_config(&mock_server.uri(), "/start", &output, "json");
    let summary = run_harvest(&config, None).await.expect("Harvest should succeed");

    assert_eq!(summary.pages_succeeded, 2);
    assert!(!summary.output_written);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_sqlite_discovery_failure_creates_no_database() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.db");

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "/start", &output, "sqlite");
    let err = run_harvest(&config, None).await.unwrap_err();

    assert!(matches!(err, HarvestError::Discovery(DiscoveryError::Fetch(_))));
    assert!(!output.exists(), "failed run created {}", output.display());
}

#[tokio::test]
async fn test_sqlite_empty_harvest_creates_no_database() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("facts.db");

    mount_start(&mock_server, listing(&[], &pager(1))).await;
    mount_page(&mock_server, 1, listing(&[], ""), 1).await;

    let config = create_test_config(&mock_server.uri(), "/start", &output, "sqlite");
    let summary = run_harvest(&config, None).await.expect("Harvest should succeed");

    assert!(!summary.output_written);
    assert!(!output.exists());
}

//! Integration tests for the crawl pipeline
//!
//! These tests use wiremock to create mock HTTP servers and run a crawl
//! end-to-end, from URL to stored record.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_probe::config::{
    Config, EmptyTitle, ExtractionConfig, FetcherConfig, OutputConfig, UserAgentConfig,
};
use sumi_probe::crawler::{crawl, Assembler, CrawlStage};
use sumi_probe::query::{build_list_plan, QueryPlan};
use sumi_probe::record::{CrawlResult, HtmlVersion, FAILED_TITLE, NO_TITLE};
use sumi_probe::storage::{ResultPage, ResultStore, SqliteStorage, StorageError, StorageResult};
use sumi_probe::ProbeError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing to the given database
fn create_test_config(db_path: &str) -> Config {
    Config {
        fetcher: FetcherConfig {
            timeout_secs: 2,
            connect_timeout_secs: 1,
            max_redirects: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        extraction: ExtractionConfig::default(),
    }
}

fn in_memory_assembler(config: &Config) -> Assembler<SqliteStorage> {
    let storage = SqliteStorage::new_in_memory().expect("Failed to open in-memory store");
    Assembler::from_config(config, Arc::new(Mutex::new(storage)))
        .expect("Failed to build assembler")
}

fn stored(assembler: &Assembler<SqliteStorage>) -> ResultPage {
    let plan = build_list_plan(1, 100, "", None).unwrap();
    let store = assembler.store();
    let store = store.lock().unwrap();
    store.list_page(&plan).unwrap()
}

async fn mount_html(server: &MockServer, route: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.into())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// A store that rejects every write
struct FailingStore;

impl ResultStore for FailingStore {
    fn save(&mut self, _record: &CrawlResult) -> StorageResult<i64> {
        Err(StorageError::Database("database is locked".to_string()))
    }

    fn get_by_id(&self, _id: i64) -> StorageResult<Option<CrawlResult>> {
        Ok(None)
    }

    fn list_page(&self, _plan: &QueryPlan) -> StorageResult<ResultPage> {
        Ok(ResultPage::default())
    }

    fn delete_by_ids(&mut self, _ids: &[i64]) -> StorageResult<usize> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_full_crawl_html5_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        format!(
            r##"<!DOCTYPE html>
            <html><head><title>Example</title></head><body>
            <h1>Welcome</h1>
            <h2>One</h2><h2>Two</h2>
            <a href="/about">About</a>
            <a href="{}/contact">Contact</a>
            <a href="https://other.example/">Elsewhere</a>
            <a href="#">Top</a>
            <a>No target</a>
            <form action="/login" method="post">
                <input type="text" name="user">
                <input type="password" name="pass">
            </form>
            </body></html>"##,
            base_url
        ),
    )
    .await;

    let config = create_test_config(":memory:");
    let assembler = in_memory_assembler(&config);

    let outcome = assembler.crawl(&format!("{}/", base_url)).await;
    assert!(outcome.is_success(), "crawl failed: {:?}", outcome.error);
    assert_eq!(outcome.stage(), CrawlStage::Saved);

    let record = &outcome.record;
    assert_eq!(record.html_version, HtmlVersion::Html5);
    assert_eq!(record.page_title, "Example");
    assert_eq!(record.heading_counts.get("h1"), Some(&1));
    assert_eq!(record.heading_counts.get("h2"), Some(&2));
    assert_eq!(record.heading_counts.get("h3"), None);
    assert_eq!(record.internal_link_count, 2);
    assert_eq!(record.external_link_count, 1);
    assert_eq!(record.inaccessible_link_count, 0);
    assert!(record.has_login_form);
    assert_eq!(record.error, "");

    // The stored row matches the returned record
    let id = outcome.id.expect("record should be stored");
    let store = assembler.store();
    let saved = store
        .lock()
        .unwrap()
        .get_by_id(id)
        .unwrap()
        .expect("row should exist");
    assert_eq!(saved.page_title, "Example");
    assert_eq!(saved.heading_counts, record.heading_counts);
    assert_eq!(saved.internal_link_count, 2);
    assert!(saved.has_login_form);
    assert!(saved.created_at.is_some());
}

#[tokio::test]
async fn test_crawl_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>UA</title>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let assembler = in_memory_assembler(&create_test_config(":memory:"));
    let outcome = assembler.crawl(&format!("{}/ua", mock_server.uri())).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.record.page_title, "UA");
}

#[tokio::test]
async fn test_crawl_strict_doctypes() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/html4",
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">
        <html><head><title>Old</title></head><body></body></html>"#,
    )
    .await;
    mount_html(
        &mock_server,
        "/xhtml",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
        <html><head><title>X</title></head><body></body></html>"#,
    )
    .await;
    mount_html(&mock_server, "/bare", "<html><body>no doctype</body></html>").await;

    let assembler = in_memory_assembler(&create_test_config(":memory:"));
    let base = mock_server.uri();

    let html4 = assembler.crawl(&format!("{}/html4", base)).await;
    assert_eq!(html4.record.html_version, HtmlVersion::Html401Strict);

    let xhtml = assembler.crawl(&format!("{}/xhtml", base)).await;
    assert_eq!(xhtml.record.html_version, HtmlVersion::Xhtml10Strict);

    let bare = assembler.crawl(&format!("{}/bare", base)).await;
    assert_eq!(bare.record.html_version, HtmlVersion::Unknown);
    assert_eq!(bare.record.page_title, "");
    assert!(bare.is_success());
}

#[tokio::test]
async fn test_crawl_empty_title_sentinel_policy() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<html><head></head><body></body></html>").await;

    let mut config = create_test_config(":memory:");
    config.extraction.empty_title = EmptyTitle::Sentinel;
    let assembler = in_memory_assembler(&config);

    let outcome = assembler.crawl(&mock_server.uri()).await;
    assert!(outcome.is_success());
    assert_eq!(outcome.record.page_title, NO_TITLE);
}

#[tokio::test]
async fn test_http_error_status_is_recorded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("<title>Not Found</title><a href=\"/\">home</a>"),
        )
        .mount(&mock_server)
        .await;

    let assembler = in_memory_assembler(&create_test_config(":memory:"));
    let outcome = assembler
        .crawl(&format!("{}/missing", mock_server.uri()))
        .await;

    assert!(matches!(outcome.error, Some(ProbeError::UrlFetchFailed { .. })));
    assert_eq!(outcome.stage(), CrawlStage::Failed);
    assert_eq!(outcome.record.error, "URL returned status code: 404");
    assert_eq!(outcome.record.page_title, FAILED_TITLE);
    assert_eq!(outcome.record.html_version, HtmlVersion::Unknown);
    assert_eq!(outcome.record.total_links(), 0);
    assert!(outcome.record.heading_counts.is_empty());
    assert!(!outcome.record.has_login_form);

    let page = stored(&assembler);
    assert_eq!(page.total_count, 1);
    assert_eq!(page.records[0].id, outcome.id);
    assert_eq!(page.records[0].error, "URL returned status code: 404");
    assert_eq!(page.records[0].total_links(), 0);
}

#[tokio::test]
async fn test_server_error_status_is_recorded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let assembler = in_memory_assembler(&create_test_config(":memory:"));
    let outcome = assembler.crawl(&mock_server.uri()).await;

    assert_eq!(outcome.record.error, "URL returned status code: 503");
    assert_eq!(stored(&assembler).total_count, 1);
}

#[tokio::test]
async fn test_invalid_url_performs_no_request_or_write() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let assembler = in_memory_assembler(&create_test_config(":memory:"));
    let outcome = assembler.crawl("not a url").await;

    assert!(matches!(outcome.error, Some(ProbeError::InvalidUrlFormat(_))));
    assert_eq!(
        outcome.error.as_ref().map(ProbeError::status_code),
        Some(reqwest::StatusCode::BAD_REQUEST)
    );
    assert_eq!(outcome.id, None);
    assert_eq!(stored(&assembler).total_count, 0);
}

#[tokio::test]
async fn test_latin1_page_is_decoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(
                    b"<!DOCTYPE html><html><head><title>Caf\xe9 cr\xe8me</title></head><body><h1>Men\xfc</h1></body></html>"
                        .to_vec(),
                )
                .insert_header("content-type", "text/html; charset=ISO-8859-1"),
        )
        .mount(&mock_server)
        .await;

    let assembler = in_memory_assembler(&create_test_config(":memory:"));
    let outcome = assembler.crawl(&mock_server.uri()).await;

    assert!(outcome.is_success(), "crawl failed: {:?}", outcome.error);
    assert_eq!(outcome.record.page_title, "Café crème");
    assert_eq!(outcome.record.heading_counts.get("h1"), Some(&1));
}

#[tokio::test]
async fn test_body_contradicting_declared_charset_is_parse_failure() {
    let mock_server = MockServer::start().await;

    let mut body = b"<html><head><title>Broken</title></head><body>".to_vec();
    body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let assembler = in_memory_assembler(&create_test_config(":memory:"));
    let outcome = assembler.crawl(&mock_server.uri()).await;

    assert!(matches!(outcome.error, Some(ProbeError::HtmlParseFailed { .. })));
    assert_eq!(outcome.last_stage, CrawlStage::BodyRead);
    assert!(outcome.record.error.starts_with("failed to parse HTML"));
    assert_eq!(outcome.record.page_title, FAILED_TITLE);

    let page = stored(&assembler);
    assert_eq!(page.total_count, 1);
    assert_eq!(page.records[0].page_title, FAILED_TITLE);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<title>Too late</title>")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(":memory:");
    config.fetcher.timeout_secs = 1;
    let assembler = in_memory_assembler(&config);

    let outcome = assembler.crawl(&mock_server.uri()).await;

    assert!(matches!(outcome.error, Some(ProbeError::UrlFetchFailed { .. })));
    assert!(outcome.record.error.starts_with("failed to fetch URL"));
    assert_eq!(outcome.record.page_title, FAILED_TITLE);
    assert_eq!(stored(&assembler).total_count, 1);
}

#[tokio::test]
async fn test_save_failure_on_success_path() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<!DOCTYPE html><title>Example</title><a href=\"/a\">a</a>").await;

    let config = create_test_config(":memory:");
    let assembler = Assembler::from_config(&config, Arc::new(Mutex::new(FailingStore))).unwrap();

    let outcome = assembler.crawl(&mock_server.uri()).await;

    assert!(matches!(outcome.error, Some(ProbeError::Storage(_))));
    assert_eq!(outcome.id, None);
    assert_eq!(outcome.last_stage, CrawlStage::Extracted);
    assert!(outcome
        .record
        .error
        .starts_with("failed to save crawl result"));
    // Extracted fields survive so the caller can still report them
    assert_eq!(outcome.record.page_title, "Example");
    assert_eq!(outcome.record.internal_link_count, 1);
}

#[tokio::test]
async fn test_save_failure_on_failure_path_keeps_original_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(":memory:");
    let assembler = Assembler::from_config(&config, Arc::new(Mutex::new(FailingStore))).unwrap();

    let outcome = assembler.crawl(&mock_server.uri()).await;

    assert!(matches!(outcome.error, Some(ProbeError::UrlFetchFailed { .. })));
    assert_eq!(outcome.record.error, "URL returned status code: 404");
    assert_eq!(outcome.id, None);
}

#[tokio::test]
async fn test_crawl_entry_point_persists_to_file() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<!DOCTYPE html><title>On disk</title>").await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("probe.db");
    let config = create_test_config(db_path.to_str().unwrap());

    let outcome = crawl(&config, &mock_server.uri())
        .await
        .expect("Crawl should start");
    assert!(outcome.is_success());
    let id = outcome.id.unwrap();

    // Reopen the database and read the row back
    let storage = SqliteStorage::new(&db_path).expect("Failed to reopen database");
    let saved = storage.get_by_id(id).unwrap().expect("row should exist");
    assert_eq!(saved.page_title, "On disk");
    assert_eq!(saved.url.as_deref(), Some(mock_server.uri().as_str()));
}

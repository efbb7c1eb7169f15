//! Integration tests for listing and deleting stored results
//!
//! Results are seeded directly through the store; listing and deletion go
//! through the same entry points the CLI uses.

use std::sync::Mutex;
use sumi_probe::output::format_result_page;
use sumi_probe::query::{build_list_plan, list_results};
use sumi_probe::record::{CrawlResult, HtmlVersion};
use sumi_probe::storage::{delete_results, find_result, ResultStore, SqliteStorage, StorageError};
use sumi_probe::{ProbeError, ResultPage};

/// Seeds a store with the given (title, url, internal links) rows
fn seeded_store(rows: &[(&str, &str, u32)]) -> Mutex<SqliteStorage> {
    let mut storage = SqliteStorage::new_in_memory().expect("Failed to open store");
    for (title, url, internal) in rows {
        let mut record = CrawlResult::new(*url);
        record.html_version = HtmlVersion::Html5;
        record.page_title = title.to_string();
        record.internal_link_count = *internal;
        storage.save(&record).expect("Failed to seed row");
    }
    Mutex::new(storage)
}

/// Builds the plan and runs it, as the `list` command does
fn list(
    store: &Mutex<SqliteStorage>,
    page: i64,
    page_size: i64,
    search_text: &str,
    sort_spec: Option<&str>,
) -> Result<ResultPage, ProbeError> {
    let plan = build_list_plan(page, page_size, search_text, sort_spec)?;
    list_results(store, &plan)
}

fn titles(page: &ResultPage) -> Vec<&str> {
    page.records.iter().map(|r| r.page_title.as_str()).collect()
}

fn numbered_store(count: usize) -> Mutex<SqliteStorage> {
    let rows: Vec<(String, String)> = (1..=count)
        .map(|i| (format!("Page {:02}", i), format!("https://site.example/{}", i)))
        .collect();
    let refs: Vec<(&str, &str, u32)> = rows
        .iter()
        .map(|(t, u)| (t.as_str(), u.as_str(), 0))
        .collect();
    seeded_store(&refs)
}

#[test]
fn test_default_listing_is_newest_first() {
    let store = numbered_store(3);

    let page = list(&store, 1, 10, "", None).unwrap();
    assert_eq!(page.total_count, 3);
    assert_eq!(titles(&page), vec!["Page 03", "Page 02", "Page 01"]);
}

#[test]
fn test_pagination_and_total_count() {
    let store = numbered_store(25);

    let first = list(&store, 1, 10, "", None).unwrap();
    assert_eq!(first.records.len(), 10);
    assert_eq!(first.total_count, 25);

    let last = list(&store, 3, 10, "", None).unwrap();
    assert_eq!(last.records.len(), 5);
    assert_eq!(last.total_count, 25);

    let beyond = list(&store, 9, 10, "", None).unwrap();
    assert!(beyond.records.is_empty());
    assert_eq!(beyond.total_count, 25);
}

#[test]
fn test_paging_input_is_normalized() {
    let store = numbered_store(15);

    for (page, page_size) in [(0, 0), (-3, 10), (1, -1)] {
        let result = list(&store, page, page_size, "", None).unwrap();
        assert_eq!(result.records.len(), 10, "page={page} page_size={page_size}");
        assert_eq!(result.records[0].page_title, "Page 15");
    }
}

#[test]
fn test_listing_header_uses_normalized_paging() {
    let store = numbered_store(15);

    let plan = build_list_plan(0, -5, "", None).unwrap();
    let page = list_results(&store, &plan).unwrap();
    let text = format_result_page(&page, plan.page, plan.page_size);

    assert!(text.starts_with("15 result(s), page 1 of 2"));
}

#[test]
fn test_search_matches_title_or_url() {
    let store = seeded_store(&[
        ("Rust Blog", "https://blog.example/rust", 1),
        ("Recipes", "https://food.example/", 2),
        ("Home", "https://rust-lang.example/", 3),
    ]);

    let page = list(&store, 1, 10, "rust", None).unwrap();
    assert_eq!(page.total_count, 2);
    assert_eq!(titles(&page), vec!["Home", "Rust Blog"]);

    let page = list(&store, 1, 10, "Rust", None).unwrap();
    assert_eq!(titles(&page), vec!["Rust Blog"]);

    let page = list(&store, 1, 10, "nothing", None).unwrap();
    assert_eq!(page.total_count, 0);
    assert!(page.records.is_empty());
}

#[test]
fn test_search_treats_wildcards_literally() {
    let store = seeded_store(&[
        ("100% uptime", "https://a.example/", 0),
        ("100 percent", "https://b.example/", 0),
        ("snake_case", "https://c.example/", 0),
        ("snakeXcase", "https://d.example/", 0),
    ]);

    let page = list(&store, 1, 10, "100%", None).unwrap();
    assert_eq!(titles(&page), vec!["100% uptime"]);

    let page = list(&store, 1, 10, "e_c", None).unwrap();
    assert_eq!(titles(&page), vec!["snake_case"]);
}

#[test]
fn test_sort_spec() {
    let store = seeded_store(&[
        ("Bravo", "https://b.example/", 5),
        ("Alpha", "https://a.example/", 5),
        ("Charlie", "https://c.example/", 1),
    ]);

    let page = list(&store, 1, 10, "", Some(r#"{"page_title": true}"#)).unwrap();
    assert_eq!(titles(&page), vec!["Alpha", "Bravo", "Charlie"]);

    let page = list(
        &store,
        1,
        10,
        "",
        Some(r#"{"internal_link_count": false, "page_title": true}"#),
    )
    .unwrap();
    assert_eq!(titles(&page), vec!["Alpha", "Bravo", "Charlie"]);

    let page = list(
        &store,
        1,
        10,
        "",
        Some(r#"{"internal_link_count": true, "page_title": false}"#),
    )
    .unwrap();
    assert_eq!(titles(&page), vec!["Charlie", "Bravo", "Alpha"]);

    // Empty spec falls back to newest first
    for spec in ["", "{}"] {
        let page = list(&store, 1, 10, "", Some(spec)).unwrap();
        assert_eq!(titles(&page), vec!["Charlie", "Alpha", "Bravo"]);
    }
}

#[test]
fn test_invalid_sort_spec_is_rejected() {
    let store = numbered_store(2);

    for spec in [
        "not json",
        r#"{"page_title": "asc"}"#,
        r#"{"page_title; DROP TABLE crawl_results": true}"#,
        "[1, 2]",
    ] {
        let err = list(&store, 1, 10, "", Some(spec)).unwrap_err();
        assert!(
            matches!(err, ProbeError::SortSpecInvalid(_)),
            "{spec:?} should be rejected"
        );
        assert_eq!(err.status_code(), reqwest::StatusCode::BAD_REQUEST);
    }

    // The table is intact
    assert_eq!(list(&store, 1, 10, "", None).unwrap().total_count, 2);
}

#[test]
fn test_delete_results() {
    let store = numbered_store(4);

    let deleted = delete_results(&store, &[1, 3]).unwrap();
    assert_eq!(deleted, 2);

    let page = list(&store, 1, 10, "", None).unwrap();
    assert_eq!(titles(&page), vec!["Page 04", "Page 02"]);
    assert!(find_result(&store, 1).unwrap().is_none());
    assert!(find_result(&store, 2).unwrap().is_some());
}

#[test]
fn test_delete_partial_match_succeeds() {
    let store = numbered_store(2);

    let deleted = delete_results(&store, &[2, 99, 2]).unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(list(&store, 1, 10, "", None).unwrap().total_count, 1);
}

#[test]
fn test_delete_empty_ids_is_noop() {
    let store = numbered_store(2);

    assert_eq!(delete_results(&store, &[]).unwrap(), 0);
    assert_eq!(list(&store, 1, 10, "", None).unwrap().total_count, 2);
}

#[test]
fn test_delete_unknown_ids_is_not_found() {
    let store = numbered_store(2);

    let err = delete_results(&store, &[41, 42]).unwrap_err();
    assert!(matches!(
        err,
        ProbeError::Storage(StorageError::NotFound(_))
    ));
    assert_eq!(err.status_code(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(
        err.to_string(),
        "Storage error: no records found for batch delete with provided IDs"
    );
    assert_eq!(list(&store, 1, 10, "", None).unwrap().total_count, 2);
}

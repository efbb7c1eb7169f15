//! Plain-text rendering
//!
//! Formats crawl results for the terminal: a detailed report for one result
//! and a one-line-per-result table for a listing.

use crate::record::CrawlResult;
use crate::storage::ResultPage;

const TITLE_WIDTH: usize = 40;

/// Formats a single crawl result as a report
///
/// # Arguments
///
/// * `record` - The crawl result
///
/// # Returns
///
/// A multi-line report
pub fn format_record(record: &CrawlResult) -> String {
    let mut out = String::new();

    match record.id {
        Some(id) => out.push_str(&format!("Crawl result #{}\n", id)),
        None => out.push_str("Crawl result (not stored)\n"),
    }
    out.push_str(&format!("  URL:            {}\n", display_url(record)));
    if let Some(created_at) = record.created_at {
        out.push_str(&format!(
            "  Crawled at:     {}\n",
            created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    if !record.is_success() {
        out.push_str(&format!("  Status:         FAILED ({})\n", record.error));
        out.push_str(&format!("  Title:          {}\n", record.page_title));
        return out;
    }

    out.push_str(&format!("  HTML version:   {}\n", record.html_version));
    out.push_str(&format!("  Title:          {}\n", record.page_title));

    if record.heading_counts.is_empty() {
        out.push_str("  Headings:       none\n");
    } else {
        let headings: Vec<String> = record
            .heading_counts
            .iter()
            .map(|(level, count)| format!("{}={}", level, count))
            .collect();
        out.push_str(&format!("  Headings:       {}\n", headings.join(" ")));
    }

    out.push_str(&format!(
        "  Links:          {} internal, {} external, {} inaccessible\n",
        record.internal_link_count, record.external_link_count, record.inaccessible_link_count
    ));
    out.push_str(&format!(
        "  Login form:     {}\n",
        if record.has_login_form { "yes" } else { "no" }
    ));

    out
}

/// Formats one page of a listing as a table
///
/// # Arguments
///
/// * `page` - The result page
/// * `page_number` - The 1-based page that was requested
/// * `page_size` - Rows per page
pub fn format_result_page(page: &ResultPage, page_number: i64, page_size: i64) -> String {
    let mut out = String::new();

    let total_pages = match u64::try_from(page_size) {
        Ok(size) if size > 0 => page.total_count.div_ceil(size),
        _ => 0,
    };
    out.push_str(&format!(
        "{} result(s), page {} of {}\n\n",
        page.total_count,
        page_number,
        total_pages.max(1)
    ));

    if page.records.is_empty() {
        out.push_str("No crawl results.\n");
        return out;
    }

    out.push_str(&format!(
        "{:>6}  {:<16}  {:<width$}  {:>5}  {:>5}  {:>5}  {:<5}  {}\n",
        "ID",
        "VERSION",
        "TITLE",
        "INT",
        "EXT",
        "INACC",
        "LOGIN",
        "URL",
        width = TITLE_WIDTH
    ));

    for record in &page.records {
        let id = record
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>6}  {:<16}  {:<width$}  {:>5}  {:>5}  {:>5}  {:<5}  {}\n",
            id,
            record.html_version.label(),
            truncate(&record.page_title, TITLE_WIDTH),
            record.internal_link_count,
            record.external_link_count,
            record.inaccessible_link_count,
            if record.has_login_form { "yes" } else { "no" },
            display_url(record),
            width = TITLE_WIDTH
        ));
    }

    out
}

fn display_url(record: &CrawlResult) -> &str {
    record.url.as_deref().unwrap_or("(none)")
}

/// Shortens to at most `max` characters, marking the cut with `...`
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

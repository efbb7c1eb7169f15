//! HTML parsing and structural extraction
//!
//! This module turns a fetched body into the metadata stored for a crawl:
//! - HTML version (from the raw text)
//! - Page title
//! - Heading histogram (`h1`..`h6`)
//! - Internal / external / inaccessible link counts
//! - Login form detection
//!
//! Extraction is a pure function of the document text, the base URL and the
//! policy switches.

use crate::config::{EmptyTitle, ExtractionConfig, HeadingCounts, UnresolvableLinks};
use crate::crawler::decode::decode_body;
use crate::record::{CrawlResult, HtmlVersion, NO_TITLE};
use crate::url::same_authority;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Failure to turn a body into a document tree
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response body is not valid {encoding}")]
    InvalidEncoding { encoding: &'static str },
}

/// A parsed document together with the text it was parsed from
pub struct ParsedDocument {
    pub raw: String,
    pub html: Html,
}

/// Decodes raw bytes and parses them into a queryable element tree
///
/// `content_type` is the response's Content-Type header; its `charset`
/// parameter selects the decoder. The tree builder itself recovers from any
/// markup, so a body that is malformed for its declared encoding is the only
/// failure.
pub fn parse_document(
    body: &[u8],
    content_type: Option<&str>,
) -> Result<ParsedDocument, ParseError> {
    let raw = decode_body(body, content_type)?;
    let html = Html::parse_document(&raw);
    Ok(ParsedDocument { raw, html })
}

/// Everything extraction computes for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub html_version: HtmlVersion,
    pub page_title: String,
    pub heading_counts: BTreeMap<String, u32>,
    pub internal_link_count: u32,
    pub external_link_count: u32,
    pub inaccessible_link_count: u32,
    pub has_login_form: bool,
}

impl ExtractedFields {
    /// Copies the extracted fields into a record
    pub fn apply_to(self, record: &mut CrawlResult) {
        record.html_version = self.html_version;
        record.page_title = self.page_title;
        record.heading_counts = self.heading_counts;
        record.internal_link_count = self.internal_link_count;
        record.external_link_count = self.external_link_count;
        record.inaccessible_link_count = self.inaccessible_link_count;
        record.has_login_form = self.has_login_form;
    }
}

/// Extracts all structural fields from a parsed document
///
/// # Arguments
///
/// * `document` - The parsed document and its raw text
/// * `base_url` - The URL the crawl was requested for; links resolve against it
/// * `policy` - Title, heading and unresolvable-link policies
///
/// # Example
///
/// ```
/// use sumi_probe::config::ExtractionConfig;
/// use sumi_probe::crawler::{extract, parse_document};
/// use url::Url;
///
/// let body = r#"<!DOCTYPE html><title>Test</title><a href="/a">A</a><a href="https://other.com/">B</a>"#;
/// let document = parse_document(body.as_bytes(), None).unwrap();
/// let base_url = Url::parse("https://example.com/").unwrap();
///
/// let fields = extract(&document, &base_url, &ExtractionConfig::default());
/// assert_eq!(fields.page_title, "Test");
/// assert_eq!((fields.internal_link_count, fields.external_link_count), (1, 1));
/// ```
pub fn extract(
    document: &ParsedDocument,
    base_url: &Url,
    policy: &ExtractionConfig,
) -> ExtractedFields {
    let html = &document.html;
    let links = count_links(html, base_url, policy.unresolvable_links);

    ExtractedFields {
        html_version: HtmlVersion::detect(&document.raw),
        page_title: extract_title(html, policy.empty_title),
        heading_counts: count_headings(html, policy.heading_counts),
        internal_link_count: links.internal,
        external_link_count: links.external,
        inaccessible_link_count: links.inaccessible,
        has_login_form: has_login_form(html),
    }
}

/// Extracts the text of the first <title>, as written
fn extract_title(document: &Html, policy: EmptyTitle) -> String {
    let title = Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|element| element.text().collect::<String>())
        })
        .unwrap_or_default();

    match policy {
        EmptyTitle::Sentinel if title.is_empty() => NO_TITLE.to_string(),
        _ => title,
    }
}

/// Counts `h1`..`h6` elements
fn count_headings(document: &Html, policy: HeadingCounts) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();

    for level in 1..=6 {
        let tag = format!("h{}", level);
        let Ok(selector) = Selector::parse(&tag) else {
            continue;
        };

        let count = document.select(&selector).count() as u32;
        if count > 0 || policy == HeadingCounts::IncludeZero {
            counts.insert(tag, count);
        }
    }

    counts
}

#[derive(Debug, Default)]
struct LinkCounts {
    internal: u32,
    external: u32,
    inaccessible: u32,
}

/// Classifies every anchor against the base URL
///
/// **Skipped:** anchors without `href`, with an empty `href`, or with
/// exactly `#`.
///
/// **Counted:** resolved links on the base URL's authority are internal,
/// everything else (other hosts, other ports, `mailto:` and friends) is
/// external. Links that fail to resolve are inaccessible only under
/// `UnresolvableLinks::Count`.
fn count_links(document: &Html, base_url: &Url, policy: UnresolvableLinks) -> LinkCounts {
    let mut counts = LinkCounts::default();

    let Ok(anchor_selector) = Selector::parse("a") else {
        return counts;
    };

    for anchor in document.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let href = href.trim();
        if href.is_empty() || href == "#" {
            continue;
        }

        match base_url.join(href) {
            Ok(resolved) if same_authority(base_url, &resolved) => counts.internal += 1,
            Ok(_) => counts.external += 1,
            Err(e) => {
                tracing::trace!(href, error = %e, "Unresolvable link");
                if policy == UnresolvableLinks::Count {
                    counts.inaccessible += 1;
                }
            }
        }
    }

    counts
}

/// Returns true if any <form> contains a password input
fn has_login_form(document: &Html) -> bool {
    let (Ok(form_selector), Ok(input_selector)) =
        (Selector::parse("form"), Selector::parse("input"))
    else {
        return false;
    };

    let is_password = |input: ElementRef<'_>| input.value().attr("type") == Some("password");

    document
        .select(&form_selector)
        .any(|form| form.select(&input_selector).any(is_password))
}

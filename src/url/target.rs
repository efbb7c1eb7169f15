use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates the URL a crawl was requested for
///
/// Only absolute `http`/`https` URLs with a host are accepted. Surrounding
/// whitespace is ignored.
///
/// # Examples
///
/// ```
/// use sumi_probe::url::parse_crawl_target;
///
/// assert!(parse_crawl_target("https://example.com/page").is_ok());
/// assert!(parse_crawl_target("example.com/page").is_err());
/// assert!(parse_crawl_target("ftp://example.com/file").is_err());
/// ```
pub fn parse_crawl_target(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

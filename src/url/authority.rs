use url::Url;

/// The host and explicitly written port of a URL
///
/// Hosts are compared case-insensitively (the `url` crate already lowercases
/// domains). No port is implied from the scheme, so `http://a.com/` and
/// `https://a.com/` share an authority while `https://a.com:8443/` does not.
/// A port equal to the scheme's default is dropped by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Authority {
    pub fn of(url: &Url) -> Self {
        Self {
            host: url.host_str().map(|h| h.to_lowercase()),
            port: url.port(),
        }
    }
}

/// Returns true if both URLs point at the same authority
///
/// A URL without a host (`mailto:`, `javascript:`) never matches.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_probe::url::same_authority;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// assert!(same_authority(&base, &Url::parse("https://EXAMPLE.com/about").unwrap()));
/// assert!(!same_authority(&base, &Url::parse("https://other.com/").unwrap()));
/// ```
pub fn same_authority(a: &Url, b: &Url) -> bool {
    let a = Authority::of(a);
    a.host.is_some() && a == Authority::of(b)
}

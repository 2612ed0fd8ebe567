use url::Url;

/// Extracts the host from a URL, lowercased
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrawler::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the origin key `scheme://host[:port]` for a URL
///
/// Robots policies and rate-limit state are keyed by origin, so two servers on
/// the same host but different ports are treated independently. Default ports
/// are omitted.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrawler::url::origin_key;
///
/// let url = Url::parse("http://127.0.0.1:8080/a/b").unwrap();
/// assert_eq!(origin_key(&url), "http://127.0.0.1:8080");
/// ```
pub fn origin_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

/// Checks whether two URLs share a hostname (case-insensitive, ports ignored)
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => false,
    }
}

use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Normalized form of a URL used as the dedup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Returns the canonical URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a URL for deduplication
///
/// # Normalization Steps
///
/// 1. Remove the fragment (everything after #)
/// 2. Remove the port if it is the scheme default (80 for http, 443 for https)
/// 3. Rewrite an empty path to `/`
///
/// Everything else (query, path case, trailing slashes) is kept as-is, so two
/// URLs only collapse when they differ by fragment or default port.
/// Canonicalization is idempotent.
///
/// # Examples
///
/// ```
/// use scrawler::url::canonicalize_url;
/// use url::Url;
///
/// let url = Url::parse("http://example.com:80/docs#intro").unwrap();
/// assert_eq!(canonicalize_url(&url).as_str(), "http://example.com/docs");
/// ```
pub fn canonicalize_url(url: &Url) -> CanonicalUrl {
    let mut canonical = url.clone();
    canonical.set_fragment(None);

    if matches!(
        (canonical.scheme(), canonical.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        // Only fails for cannot-be-a-base URLs, which have no port to begin with
        let _ = canonical.set_port(None);
    }

    if canonical.path().is_empty() {
        canonical.set_path("/");
    }

    CanonicalUrl(canonical.into())
}

/// Parses and canonicalizes a URL string
///
/// # Returns
///
/// * `Ok(CanonicalUrl)` - The canonical form
/// * `Err(UrlError)` - The string is not a valid absolute URL
pub fn canonicalize_str(url_str: &str) -> UrlResult<CanonicalUrl> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    Ok(canonicalize_url(&url))
}

/// Parses a URL and checks that it can be crawled (http or https with a host)
pub fn parse_crawlable(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_crawlable_scheme(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns true for http and https URLs
pub fn is_crawlable_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Fetching is fail-open: any failure to obtain robots.txt means no restrictions.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{RobotRule, RobotsPolicy, WILDCARD_AGENT};

use crate::url::origin_key;
use reqwest::{header, Client};
use tracing::{debug, warn};
use url::Url;

/// Fetches and parses robots.txt for an origin
///
/// # Arguments
///
/// * `client` - HTTP client carrying the crawl's timeout
/// * `origin` - The origin, `scheme://host[:port]`
/// * `user_agent` - The user agent string to send
///
/// # Returns
///
/// The parsed policy, or an allow-all policy if the fetch failed, returned a
/// status of 400 or above, or the body could not be read
pub async fn fetch_robots(client: &Client, origin: &str, user_agent: &str) -> RobotsPolicy {
    let robots_url = format!("{}/robots.txt", origin);
    debug!("Fetching {}", robots_url);

    let response = match client
        .get(&robots_url)
        .header(header::USER_AGENT, user_agent)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            debug!("robots.txt unavailable at {}: {}", robots_url, e);
            return RobotsPolicy::allow_all();
        }
    };

    if response.status().as_u16() >= 400 {
        debug!(
            "robots.txt at {} returned {}, allowing all",
            robots_url,
            response.status()
        );
        return RobotsPolicy::allow_all();
    }

    match response.text().await {
        Ok(body) => RobotsPolicy::from_content(&body),
        Err(e) => {
            debug!("Failed to read robots.txt body from {}: {}", robots_url, e);
            RobotsPolicy::allow_all()
        }
    }
}

/// Result of probing a URL against its origin's robots.txt
#[derive(Debug, Clone)]
pub struct RobotsProbe {
    /// The URL that was checked
    pub url: Url,
    /// Where robots.txt was looked up
    pub robots_url: String,
    /// Whether the user agent may fetch `url`
    pub allowed: bool,
    /// HTTP status of the robots.txt response, `None` if no response arrived
    pub status: Option<u16>,
    /// Content-Type header of the robots.txt response, if any
    pub content_type: Option<String>,
    /// Raw robots.txt body, empty when it could not be read
    pub body: String,
    /// Why robots.txt could not be retrieved; the decision then allows everything
    pub fetch_error: Option<String>,
}

impl RobotsProbe {
    /// Returns true when the robots.txt response looks like plain text
    pub fn is_plain_text(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(true, |ct| ct.to_lowercase().contains("text/plain"))
    }

    fn unreachable(url: &Url, robots_url: String, status: Option<u16>, error: String) -> Self {
        Self {
            url: url.clone(),
            robots_url,
            allowed: true,
            status,
            content_type: None,
            body: String::new(),
            fetch_error: Some(error),
        }
    }
}

/// Fetches robots.txt for a URL's origin and evaluates the URL against it
///
/// The decision follows the same fail-open rule as crawling: a transport or
/// body-read error allows the URL, and the error is kept in `fetch_error` so
/// the `test robots` command can show why robots.txt was unavailable.
pub async fn probe(client: &Client, url: &Url, user_agent: &str) -> RobotsProbe {
    let robots_url = format!("{}/robots.txt", origin_key(url));

    let response = match client
        .get(&robots_url)
        .header(header::USER_AGENT, user_agent)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!("Could not fetch {}: {}", robots_url, e);
            return RobotsProbe::unreachable(url, robots_url, None, e.to_string());
        }
    };

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Could not read {}: {}", robots_url, e);
            return RobotsProbe::unreachable(url, robots_url, Some(status), e.to_string());
        }
    };

    let policy = if status >= 400 {
        RobotsPolicy::allow_all()
    } else {
        RobotsPolicy::from_content(&body)
    };
    let path = if url.path().is_empty() { "/" } else { url.path() };

    let probe = RobotsProbe {
        url: url.clone(),
        robots_url,
        allowed: policy.is_allowed(user_agent, path),
        status: Some(status),
        content_type,
        body,
        fetch_error: None,
    };

    if status < 400 && !probe.is_plain_text() {
        warn!(
            "robots.txt content type is {}, expected text/plain",
            probe.content_type.as_deref().unwrap_or_default()
        );
    }

    probe
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_robots_sends_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .and(header_matcher("user-agent", "ProbeBot/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /a\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let policy = fetch_robots(&Client::new(), &mock_server.uri(), "ProbeBot/1.0").await;
        assert!(!policy.is_allowed("ProbeBot/1.0", "/a"));
    }

    #[tokio::test]
    async fn test_fetch_robots_unreachable_allows_all() {
        // Nothing listens on port 9 in the test environment
        let policy = fetch_robots(&Client::new(), "http://127.0.0.1:9", "TestBot").await;
        assert!(policy.is_allowed("TestBot", "/anything"));
    }

    #[tokio::test]
    async fn test_probe_reports_decision_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("User-agent: *\nDisallow: /jobs\n")
                    .insert_header("content-type", "text/plain"),
            )
            .mount(&mock_server)
            .await;

        let url = Url::parse(&format!("{}/jobs/42", mock_server.uri())).unwrap();
        let probe = probe(&Client::new(), &url, "TestBot").await;

        assert!(!probe.allowed);
        assert_eq!(probe.status, Some(200));
        assert!(probe.fetch_error.is_none());
        assert!(probe.is_plain_text());
        assert!(probe.body.contains("Disallow: /jobs"));
        assert_eq!(probe.robots_url, format!("{}/robots.txt", mock_server.uri()));
    }

    #[tokio::test]
    async fn test_probe_missing_robots_allows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&format!("{}/anything", mock_server.uri())).unwrap();
        let probe = probe(&Client::new(), &url, "TestBot").await;

        assert!(probe.allowed);
        assert_eq!(probe.status, Some(404));
    }

    #[tokio::test]
    async fn test_probe_unreachable_robots_allows() {
        // Nothing listens on port 9 in the test environment
        let url = Url::parse("http://127.0.0.1:9/page").unwrap();
        let probe = probe(&Client::new(), &url, "TestBot").await;

        assert!(probe.allowed);
        assert_eq!(probe.status, None);
        assert!(probe.fetch_error.is_some());
        assert!(probe.body.is_empty());
        assert_eq!(probe.robots_url, "http://127.0.0.1:9/robots.txt");
    }
}

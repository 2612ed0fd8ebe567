//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the crawl's user agent and timeout
//! - Consulting robots.txt before every page request
//! - Per-host throttling
//! - Error classification into `RobotsBlocked` and `FetchFailed`
//!
//! The scheduler only sees the `Fetcher` trait, so tests can drive it with an
//! in-memory site.

use crate::config::CrawlOptions;
use crate::robots::RobotsCache;
use crate::state::RateLimiter;
use crate::url::origin_key;
use crate::{Result, ScrawlerError};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Accept header sent with page requests
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Connect timeout cap; the overall request timeout comes from the options
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Returns true if the Content-Type mentions `text/html`
    pub fn is_html(&self) -> bool {
        self.content_type.to_lowercase().contains("text/html")
    }

    /// Rejects anything that is not an HTML document
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The page can be parsed
    /// * `Err(ScrawlerError::NonHtmlContent)` - The Content-Type is not `text/html`
    pub fn ensure_html(&self) -> Result<()> {
        if self.is_html() {
            Ok(())
        } else {
            Err(ScrawlerError::NonHtmlContent {
                url: self.final_url.to_string(),
                content_type: self.content_type.clone(),
            })
        }
    }
}

/// Source of pages for the scheduler
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - A 2xx response and its body
    /// * `Err(ScrawlerError::RobotsBlocked)` - robots.txt disallows the URL
    /// * `Err(ScrawlerError::FetchFailed)` - Transport error, non-2xx status, or unreadable body
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use scrawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("scrawler/0.1", Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &str,
    timeout: Duration,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by reqwest, with robots.txt checks and per-host throttling
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
    robots: RobotsCache,
    limiter: RateLimiter,
}

impl HttpFetcher {
    /// Creates a fetcher for one run
    ///
    /// # Arguments
    ///
    /// * `options` - Supplies the user agent, timeout, and minimum per-host delay
    pub fn new(options: &CrawlOptions) -> Result<Self> {
        let client = build_http_client(&options.user_agent, options.timeout())?;
        Ok(Self {
            robots: RobotsCache::new(client.clone(), options.user_agent.clone()),
            limiter: RateLimiter::new(options.delay),
            user_agent: options.user_agent.clone(),
            client,
        })
    }

    fn fetch_failed(url: &Url, reason: impl Into<String>) -> ScrawlerError {
        ScrawlerError::FetchFailed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        if !self.robots.is_allowed(url, &self.user_agent).await {
            return Err(ScrawlerError::RobotsBlocked {
                url: url.to_string(),
            });
        }

        let waited = self.limiter.throttle(&origin_key(url)).await;
        if !waited.is_zero() {
            debug!("Throttled {} for {:?}", url, waited);
        }

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, ACCEPT_HTML)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Self::fetch_failed(url, "request timeout")
                } else if e.is_connect() {
                    Self::fetch_failed(url, format!("connection failed: {}", e))
                } else {
                    Self::fetch_failed(url, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::fetch_failed(url, format!("HTTP {}", status.as_u16())));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::fetch_failed(url, format!("failed to read body: {}", e)))?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

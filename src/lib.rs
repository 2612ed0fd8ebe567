//! Scrawler: a polite concurrent web crawler
//!
//! This crate crawls websites breadth-first from one or more seed URLs, obeying
//! robots.txt and per-host rate limits, and deduplicating both URLs and page content.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Scrawler operations
#[derive(Debug, Error)]
pub enum ScrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    #[error("URL disallowed by robots.txt: {url}")]
    RobotsBlocked { url: String },

    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Non-HTML content at {url}: {content_type}")]
    NonHtmlContent { url: String, content_type: String },

    #[error("HTML parse error for {url}: {message}")]
    ParseFailed { url: String, message: String },

    #[error("Failed to save {}: {source}", path.display())]
    SaveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid extraction format: {0}")]
    InvalidFormat(String),

    #[error("No seed URLs found: {0}")]
    NoSeeds(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Scrawler operations
pub type Result<T> = std::result::Result<T, ScrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlOptions, ExtractFormat};
pub use crawler::{run_crawl, CrawlScheduler, Fetcher, HttpFetcher};
pub use output::CrawlReport;
pub use state::{ContentFingerprint, DedupIndex, JobOutcome, RateLimiter};
pub use url::{canonicalize_url, CanonicalUrl};

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default user agent sent with page and robots.txt requests
pub const DEFAULT_USER_AGENT: &str = "scrawler/0.1 (+https://example.local)";

/// Immutable configuration for one crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOptions {
    /// URL the crawl starts from (depth 0)
    pub start_url: String,

    /// User-Agent header and robots.txt agent name
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum link depth from the seed (0 = seed only)
    pub max_depth: u32,

    /// Maximum number of pages to fetch (0 = unlimited)
    pub max_pages: usize,

    /// Only follow links on the seed's host
    pub same_host_only: bool,

    /// Number of concurrent workers
    pub concurrency: usize,

    /// Minimum delay between requests to the same host
    pub delay: Duration,

    /// Directory saved pages and extractions are written under
    pub out_dir: PathBuf,

    /// Save extracted signals next to the raw pages
    pub save_extract: bool,

    /// Format for saved extractions
    pub extract_format: ExtractFormat,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 15,
            max_depth: 2,
            max_pages: 50,
            same_host_only: true,
            concurrency: 1,
            delay: Duration::ZERO,
            out_dir: PathBuf::from("out"),
            save_extract: false,
            extract_format: ExtractFormat::Json,
        }
    }
}

impl CrawlOptions {
    /// Returns a copy of these options targeting a different seed
    pub fn for_seed(&self, start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            ..self.clone()
        }
    }

    /// Per-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Output format for saved extractions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractFormat {
    #[default]
    Json,
    Markdown,
    Text,
}

impl ExtractFormat {
    /// File extension used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Text => "txt",
        }
    }
}

impl FromStr for ExtractFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::Text),
            other => Err(ConfigError::InvalidFormat(format!(
                "expected json, md or txt, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExtractFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Options file layout; every key is optional and overrides the defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsFile {
    /// Seed URLs used when neither --url nor --url-file is given
    #[serde(default)]
    pub seeds: Vec<String>,

    #[serde(default)]
    pub crawl: CrawlSection,

    #[serde(default)]
    pub http: HttpSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Traversal limits
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlSection {
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    #[serde(rename = "same-host")]
    pub same_host: Option<bool>,

    pub concurrency: Option<usize>,

    /// Minimum per-host delay, e.g. "500ms" or "1s"
    pub delay: Option<String>,
}

/// HTTP client settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpSection {
    /// Per-request timeout in seconds
    pub timeout: Option<u64>,

    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// Where and how results are written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    pub out: Option<PathBuf>,

    #[serde(rename = "save-extract")]
    pub save_extract: Option<bool>,

    #[serde(rename = "extract-save-format")]
    pub extract_save_format: Option<String>,
}

impl OptionsFile {
    /// Layers the values present in this file over `options`
    pub fn apply_to(&self, options: &mut CrawlOptions) -> ConfigResult<()> {
        if let Some(depth) = self.crawl.max_depth {
            options.max_depth = depth;
        }
        if let Some(pages) = self.crawl.max_pages {
            options.max_pages = pages;
        }
        if let Some(same_host) = self.crawl.same_host {
            options.same_host_only = same_host;
        }
        if let Some(concurrency) = self.crawl.concurrency {
            options.concurrency = concurrency;
        }
        if let Some(delay) = &self.crawl.delay {
            options.delay = crate::config::parse_duration(delay)?;
        }
        if let Some(timeout) = self.http.timeout {
            options.timeout_secs = timeout;
        }
        if let Some(user_agent) = &self.http.user_agent {
            options.user_agent = user_agent.clone();
        }
        if let Some(out) = &self.output.out {
            options.out_dir = out.clone();
        }
        if let Some(save_extract) = self.output.save_extract {
            options.save_extract = save_extract;
        }
        if let Some(format) = &self.output.extract_save_format {
            options.extract_format = format.parse()?;
        }
        Ok(())
    }
}

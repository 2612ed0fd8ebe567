//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` seam
//! - HTML parsing and link extraction
//! - The shared frontier with quiescence detection
//! - The scheduler driving one run from a seed to completion

mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{CrawlJob, Frontier, JobLease};
pub use parser::{collapse_whitespace, parse_page, Signals};
pub use scheduler::{effective_concurrency, CrawlScheduler, PageBudget};

use crate::config::{validate, CrawlOptions};
use crate::output::CrawlReport;
use crate::Result;

/// Runs a complete crawl from `options.start_url` over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the options
/// 2. Build the HTTP client, robots.txt cache and rate limiter for this run
/// 3. Crawl until the frontier drains or the page budget is spent
///
/// # Arguments
///
/// * `options` - The options for this run
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed; per-page failures are counted in the report
/// * `Err(ScrawlerError)` - Invalid options, seed, or HTTP client setup
pub async fn run_crawl(options: CrawlOptions) -> Result<CrawlReport> {
    validate(&options)?;
    let fetcher = HttpFetcher::new(&options)?;
    CrawlScheduler::new(options, fetcher).run().await
}

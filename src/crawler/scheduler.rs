//! Crawl scheduler: one run from a seed URL to quiescence
//!
//! This module handles:
//! - Seeding and driving the frontier, sequentially or with a worker pool
//! - URL and content deduplication through the run's `DedupIndex`
//! - The page budget and the depth limit
//! - Link filtering (scheme, host scope) before re-enqueueing
//! - Panic isolation so one bad page cannot stall the run

use crate::config::CrawlOptions;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{CrawlJob, Frontier};
use crate::crawler::parser::{parse_page, Signals};
use crate::output::{save_extraction, save_page, CrawlReport, CrawlStats};
use crate::state::{ContentFingerprint, DedupIndex, JobOutcome};
use crate::url::{canonicalize_url, is_crawlable_scheme, parse_crawlable, same_host};
use crate::{Result, ScrawlerError};
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// Worker pool size for a requested concurrency
///
/// Clamped to `[1, 4 × available_parallelism]`.
pub fn effective_concurrency(requested: usize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.clamp(1, cpus * 4)
}

/// Shared page counter; a limit of 0 means unlimited
#[derive(Debug)]
pub struct PageBudget {
    limit: usize,
    used: AtomicUsize,
}

impl PageBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Claims one page slot
    ///
    /// # Returns
    ///
    /// * `Some(n)` - The slot was claimed; this is the n-th page of the run
    /// * `None` - The budget is exhausted
    pub fn try_claim(&self) -> Option<usize> {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (self.limit == 0 || used < self.limit).then_some(used + 1)
            })
            .ok()
            .map(|previous| previous + 1)
    }

    pub fn exhausted(&self) -> bool {
        self.limit > 0 && self.used.load(Ordering::SeqCst) >= self.limit
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }
}

/// What processing one job produced
#[derive(Debug)]
struct JobResult {
    outcome: JobOutcome,
    discovered: Vec<CrawlJob>,
}

impl JobResult {
    fn finished(outcome: JobOutcome) -> Self {
        Self {
            outcome,
            discovered: Vec::new(),
        }
    }
}

/// State owned by one run and shared by its workers
struct RunContext<F> {
    options: CrawlOptions,
    fetcher: Arc<F>,
    seed: Url,
    dedup: DedupIndex,
    budget: PageBudget,
    stats: CrawlStats,
}

impl<F: Fetcher> RunContext<F> {
    fn new(options: CrawlOptions, fetcher: Arc<F>, seed: Url) -> Self {
        Self {
            budget: PageBudget::new(options.max_pages),
            options,
            fetcher,
            seed,
            dedup: DedupIndex::new(),
            stats: CrawlStats::new(),
        }
    }

    /// Processes a job, converting a panic into `JobOutcome::Panicked`
    async fn process_guarded(&self, job: &CrawlJob) -> JobResult {
        match AssertUnwindSafe(self.process_job(job)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                error!(
                    "Worker panicked while processing {}: {}",
                    job.url,
                    panic_message(payload.as_ref())
                );
                JobResult::finished(JobOutcome::Panicked)
            }
        }
    }

    async fn process_job(&self, job: &CrawlJob) -> JobResult {
        let canonical = canonicalize_url(&job.url);

        if self.dedup.is_visited(&canonical) {
            debug!("Skipping already visited: {}", canonical);
            return JobResult::finished(JobOutcome::AlreadyVisited);
        }
        if self.budget.exhausted() {
            return JobResult::finished(JobOutcome::BudgetExhausted);
        }
        if !self.dedup.test_and_set_visited(&canonical) {
            debug!("Skipping already visited: {}", canonical);
            return JobResult::finished(JobOutcome::AlreadyVisited);
        }

        let page = match self.fetcher.fetch(&job.url).await {
            Ok(page) => page,
            Err(ScrawlerError::RobotsBlocked { url }) => {
                debug!("Disallowed by robots.txt: {}", url);
                return JobResult::finished(JobOutcome::RobotsBlocked);
            }
            Err(e) => {
                debug!("{}", e);
                return JobResult::finished(JobOutcome::FetchFailed);
            }
        };

        if let Err(e) = page.ensure_html() {
            debug!("Skipping {}", e);
            return JobResult::finished(JobOutcome::NonHtml);
        }

        let signals = match parse_page(&String::from_utf8_lossy(&page.body), &page.final_url) {
            Ok(signals) => signals,
            Err(e) => {
                debug!("{}", e);
                return JobResult::finished(JobOutcome::ParseFailed);
            }
        };

        let Some(count) = self.budget.try_claim() else {
            debug!("Page budget reached, dropping {}", job.url);
            return JobResult::finished(JobOutcome::BudgetExhausted);
        };

        if let Err(e) = save_page(&self.options.out_dir, &job.url, &page.body).await {
            warn!("Failed to save page for {}: {}", job.url, e);
        }
        info!("Saved ({}): {}", count, job.url);

        if !self
            .dedup
            .test_and_set_content_seen(ContentFingerprint::of(&page.body))
        {
            debug!("Duplicate content at {}, not following links", job.url);
            return JobResult::finished(JobOutcome::Duplicate);
        }

        if self.options.save_extract {
            if let Err(e) = save_extraction(
                &self.options.out_dir,
                &job.url,
                self.options.extract_format,
                &signals,
            )
            .await
            {
                warn!("Failed to save extraction for {}: {}", job.url, e);
            }
        }

        let discovered = if job.depth < self.options.max_depth {
            self.follow_links(&signals, job.depth + 1)
        } else {
            Vec::new()
        };

        JobResult {
            outcome: JobOutcome::Saved,
            discovered,
        }
    }

    /// Filters a page's links down to jobs worth enqueueing
    fn follow_links(&self, signals: &Signals, depth: u32) -> Vec<CrawlJob> {
        let mut jobs = Vec::new();

        for link in &signals.links {
            if self.budget.exhausted() {
                break;
            }

            let Ok(url) = Url::parse(link) else {
                continue;
            };
            if !is_crawlable_scheme(&url) {
                continue;
            }
            if self.options.same_host_only && !same_host(&self.seed, &url) {
                continue;
            }
            if self.dedup.is_visited(&canonicalize_url(&url)) {
                continue;
            }

            jobs.push(CrawlJob::new(url, depth));
        }

        jobs
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Single-loop driver used when only one worker is requested
async fn run_sequential<F: Fetcher>(ctx: &RunContext<F>) {
    let mut queue = VecDeque::from([CrawlJob::new(ctx.seed.clone(), 0)]);

    while let Some(job) = queue.pop_front() {
        let result = ctx.process_guarded(&job).await;
        ctx.stats.record(result.outcome);

        if ctx.budget.exhausted() {
            break;
        }
        queue.extend(result.discovered);
    }
}

/// Worker-pool driver over a shared frontier
async fn run_concurrent<F: Fetcher + 'static>(ctx: Arc<RunContext<F>>, workers: usize) {
    let frontier = Arc::new(Frontier::new());
    frontier.push(CrawlJob::new(ctx.seed.clone(), 0));

    let handles: Vec<_> = (0..workers)
        .map(|id| {
            let ctx = Arc::clone(&ctx);
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { worker_loop(id, ctx, frontier).await })
        })
        .collect();

    for handle in handles {
        if let Err(e) = handle.await {
            error!("Worker task failed: {}", e);
        }
    }
}

async fn worker_loop<F: Fetcher>(id: usize, ctx: Arc<RunContext<F>>, frontier: Arc<Frontier>) {
    let mut processed = 0usize;

    while let Some(lease) = frontier.pop().await {
        let result = ctx.process_guarded(lease.job()).await;
        ctx.stats.record(result.outcome);
        processed += 1;

        // Children must be queued before the lease drops
        for job in result.discovered {
            if !frontier.push(job) {
                break;
            }
        }
        if ctx.budget.exhausted() {
            frontier.close();
        }
        drop(lease);
    }

    debug!("Worker {} finished after {} job(s)", id, processed);
}

/// Runs one crawl from `options.start_url`
pub struct CrawlScheduler<F> {
    options: CrawlOptions,
    fetcher: Arc<F>,
}

impl<F: Fetcher + 'static> CrawlScheduler<F> {
    /// Creates a scheduler
    ///
    /// # Arguments
    ///
    /// * `options` - The immutable options for this run
    /// * `fetcher` - Where pages come from
    pub fn new(options: CrawlOptions, fetcher: F) -> Self {
        Self::with_shared_fetcher(options, Arc::new(fetcher))
    }

    /// Creates a scheduler around a fetcher the caller keeps a handle to
    pub fn with_shared_fetcher(options: CrawlOptions, fetcher: Arc<F>) -> Self {
        Self { options, fetcher }
    }

    /// Crawls until the frontier is quiescent or the page budget is spent
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run finished; per-URL failures are in the report
    /// * `Err(ScrawlerError::InvalidSeedUrl)` - The start URL is not an http(s) URL
    pub async fn run(&self) -> Result<CrawlReport> {
        let seed = parse_crawlable(&self.options.start_url).map_err(|e| {
            ScrawlerError::InvalidSeedUrl {
                url: self.options.start_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let workers = effective_concurrency(self.options.concurrency);
        let started_at = Utc::now();
        info!(
            "Starting crawl of {} (max depth {}, max pages {}, {} worker(s))",
            seed, self.options.max_depth, self.options.max_pages, workers
        );

        let ctx = Arc::new(RunContext::new(
            self.options.clone(),
            Arc::clone(&self.fetcher),
            seed.clone(),
        ));

        if workers == 1 {
            run_sequential(&ctx).await;
        } else {
            run_concurrent(Arc::clone(&ctx), workers).await;
        }

        let report = CrawlReport {
            seed: seed.to_string(),
            started_at,
            finished_at: Utc::now(),
            pages_fetched: ctx.budget.used(),
            workers,
            outcomes: ctx.stats.snapshot(),
        };

        info!(
            "Crawl complete. Fetched {} page(s) from {}",
            report.pages_fetched, report.seed
        );
        Ok(report)
    }
}

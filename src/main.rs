//! Scrawler main entry point
//!
//! This is the command-line interface for the Scrawler web crawler.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use scrawler::config::{
    gather_urls, load_options_file_with_hash, parse_duration, validate, CrawlOptions,
    ExtractFormat,
};
use scrawler::crawler::{build_http_client, run_crawl};
use scrawler::output::print_report;
use scrawler::robots;
use scrawler::url::parse_crawlable;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Scrawler: a polite concurrent web crawler
///
/// Scrawler crawls websites breadth-first while respecting robots.txt and
/// per-host rate limits, saving raw pages and optional text extractions.
#[derive(Parser, Debug)]
#[command(name = "scrawler")]
#[command(version)]
#[command(about = "A polite concurrent web crawler", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one or more seed URLs
    Crawl(CrawlArgs),

    /// Diagnostic commands
    #[command(subcommand)]
    Test(TestCommand),
}

#[derive(Subcommand, Debug)]
enum TestCommand {
    /// Fetch robots.txt for a URL and report whether the URL may be crawled
    Robots(RobotsArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL to start crawling from
    #[arg(long)]
    url: Option<String>,

    /// File with one seed URL per line
    #[arg(long, value_name = "FILE")]
    url_file: Option<PathBuf>,

    /// TOML options file; explicit flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the seed [default: 2]
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Maximum pages to fetch, 0 for unlimited [default: 50]
    #[arg(long)]
    max_pages: Option<usize>,

    /// Only follow links on the seed's host [default: true]
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    same_host: Option<bool>,

    /// Number of concurrent workers [default: 1]
    #[arg(long)]
    concurrency: Option<usize>,

    /// Minimum delay between requests to one host, e.g. 500ms or 1s [default: 0]
    #[arg(long, value_name = "DUR")]
    delay: Option<String>,

    /// Output directory [default: out]
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Save extracted signals alongside raw pages
    #[arg(long)]
    save_extract: bool,

    /// Extraction format: json, md or txt [default: json]
    #[arg(long, value_name = "FORMAT")]
    extract_save_format: Option<ExtractFormat>,

    /// Per-request timeout in seconds [default: 15]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// User-Agent header and robots.txt agent name
    #[arg(long)]
    user_agent: Option<String>,
}

#[derive(Args, Debug)]
struct RobotsArgs {
    /// URL to check
    #[arg(long)]
    url: String,

    /// Agent name to evaluate the rules for
    #[arg(long)]
    user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 15)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => handle_crawl(args).await,
        Command::Test(TestCommand::Robots(args)) => handle_test_robots(args).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scrawler=info,warn"),
            1 => EnvFilter::new("scrawler=debug,info"),
            2 => EnvFilter::new("scrawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the run options: defaults, then the config file, then explicit flags
///
/// Also returns the seeds listed in the config file, if any.
fn resolve_options(args: &CrawlArgs) -> anyhow::Result<(CrawlOptions, Vec<String>)> {
    let mut options = CrawlOptions::default();
    let mut file_seeds = Vec::new();

    if let Some(path) = &args.config {
        tracing::info!("Loading configuration from: {}", path.display());
        let (file, hash) = load_options_file_with_hash(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
        tracing::info!("Configuration loaded successfully (hash: {})", hash);

        file.apply_to(&mut options)
            .with_context(|| format!("invalid value in config file {}", path.display()))?;
        file_seeds = file.seeds;
    }

    if let Some(depth) = args.max_depth {
        options.max_depth = depth;
    }
    if let Some(pages) = args.max_pages {
        options.max_pages = pages;
    }
    if let Some(same_host) = args.same_host {
        options.same_host_only = same_host;
    }
    if let Some(concurrency) = args.concurrency {
        options.concurrency = concurrency;
    }
    if let Some(delay) = &args.delay {
        options.delay = parse_duration(delay).context("invalid --delay")?;
    }
    if let Some(out) = &args.out {
        options.out_dir = out.clone();
    }
    if args.save_extract {
        options.save_extract = true;
    }
    if let Some(format) = args.extract_save_format {
        options.extract_format = format;
    }
    if let Some(timeout) = args.timeout {
        options.timeout_secs = timeout;
    }
    if let Some(user_agent) = &args.user_agent {
        options.user_agent = user_agent.clone();
    }

    validate(&options)?;
    Ok((options, file_seeds))
}

/// Handles the crawl command: one run per seed
async fn handle_crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let (options, file_seeds) = resolve_options(&args)?;

    let seeds = gather_urls(args.url.as_deref(), args.url_file.as_deref(), &file_seeds)
        .with_context(|| match &args.url_file {
            Some(path) => format!("failed to read seed URLs from {}", path.display()),
            None => "no seed URL given".to_string(),
        })?;

    tracing::info!(
        "Crawling {} seed(s) with {} worker(s), output in {}",
        seeds.len(),
        options.concurrency.max(1),
        options.out_dir.display()
    );

    let mut failures = 0usize;
    for seed in &seeds {
        match run_crawl(options.for_seed(seed)).await {
            Ok(report) => {
                tracing::info!(
                    "Finished {}: {} page(s) in {:.2}s",
                    report.seed,
                    report.pages_fetched,
                    report.duration_seconds()
                );
                print_report(&report);
            }
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", seed, e);
                failures += 1;
            }
        }
    }

    if failures == seeds.len() {
        anyhow::bail!("all {} seed(s) failed", seeds.len());
    }
    Ok(())
}

/// Handles `test robots`: prints the robots.txt decision for one URL
async fn handle_test_robots(args: RobotsArgs) -> anyhow::Result<()> {
    let user_agent = args
        .user_agent
        .unwrap_or_else(|| CrawlOptions::default().user_agent);
    let url = parse_crawlable(&args.url).with_context(|| format!("invalid URL {}", args.url))?;

    let client = build_http_client(&user_agent, Duration::from_secs(args.timeout.max(1)))?;
    let probe = robots::probe(&client, &url, &user_agent).await;

    println!("=== Robots Check: {} ===\n", probe.url);
    println!("  robots.txt: {}", probe.robots_url);
    match probe.status {
        Some(status) => println!("  Status: {}", status),
        None => println!("  Status: (no response)"),
    }
    println!(
        "  Content-Type: {}",
        probe.content_type.as_deref().unwrap_or("(none)")
    );
    println!("  User-Agent: {}", user_agent);
    println!(
        "  Decision: {}",
        if probe.allowed { "allowed" } else { "disallowed" }
    );

    if let Some(error) = &probe.fetch_error {
        tracing::warn!(
            "robots.txt could not be fetched ({}); treating {} as unrestricted",
            error,
            probe.url
        );
    }

    if !probe.body.trim().is_empty() {
        println!("\n{}", probe.body.trim_end());
    }

    Ok(())
}

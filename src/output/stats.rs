//! Run statistics and the end-of-run report
//!
//! Workers record one `JobOutcome` per dequeued job; the scheduler turns the
//! tally into a `CrawlReport` when the run ends.

use crate::state::JobOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Outcome counters shared by a run's workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    counts: Mutex<HashMap<JobOutcome, usize>>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one job
    pub fn record(&self, outcome: JobOutcome) {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.entry(outcome).or_insert(0) += 1;
    }

    /// Returns the number of jobs that ended with `outcome`
    pub fn count(&self, outcome: JobOutcome) -> usize {
        self.counts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&outcome)
            .copied()
            .unwrap_or(0)
    }

    /// Sorted copy of the non-zero counters
    pub fn snapshot(&self) -> BTreeMap<JobOutcome, usize> {
        self.counts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(outcome, count)| (*outcome, *count))
            .collect()
    }
}

/// Summary of one crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// The seed URL the run started from
    pub seed: String,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    /// Pages that claimed a budget slot (saved, including duplicates)
    pub pages_fetched: usize,

    /// Number of worker tasks used
    pub workers: usize,

    /// Jobs per terminal outcome
    pub outcomes: BTreeMap<JobOutcome, usize>,
}

impl CrawlReport {
    /// Returns the number of jobs that ended with `outcome`
    pub fn count(&self, outcome: JobOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Total number of jobs taken off the frontier
    pub fn total_jobs(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Number of jobs that ended in an error state
    pub fn errors(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Wall-clock run time in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Prints a report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report: {} ===\n", report.seed);

    println!("Overview:");
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Jobs processed: {}", report.total_jobs());
    println!("  Workers: {}", report.workers);
    println!("  Duration: {:.2}s", report.duration_seconds());
    println!();

    if !report.outcomes.is_empty() {
        println!("Jobs by Outcome:");
        // Sort outcomes by count (descending)
        let mut outcome_counts: Vec<_> = report.outcomes.iter().collect();
        outcome_counts.sort_by(|a, b| b.1.cmp(a.1));

        let total = report.total_jobs();
        for (outcome, count) in outcome_counts {
            let percentage = if total > 0 {
                (*count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", outcome, count, percentage);
        }
        println!();
    }

    let errors = report.errors();
    if errors > 0 {
        println!("Errors: {}", errors);
        println!();
    }
}

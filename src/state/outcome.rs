/// Job outcome definitions for tracking crawl progress
///
/// Every job taken off the frontier ends in exactly one of these states.
use serde::Serialize;
use std::fmt;

/// Terminal state of one dequeued crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    // ===== Counted Pages =====
    /// Page was fetched, parsed and saved; its content was new
    Saved,

    /// Page was saved but its content had already been seen; links not followed
    Duplicate,

    // ===== Skips =====
    /// Canonical URL was already visited by another job
    AlreadyVisited,

    /// Page budget was reached before this job could be counted
    BudgetExhausted,

    /// robots.txt disallows the URL
    RobotsBlocked,

    /// Response Content-Type is not HTML
    NonHtml,

    // ===== Errors =====
    /// Transport error, non-2xx status, or unreadable body
    FetchFailed,

    /// HTML could not be parsed
    ParseFailed,

    /// The job's task panicked; the worker survived
    Panicked,
}

impl JobOutcome {
    /// Returns true if the job consumed a slot of the page budget
    pub fn is_counted(&self) -> bool {
        matches!(self, Self::Saved | Self::Duplicate)
    }

    /// Returns true if the job was skipped without a fault
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::AlreadyVisited | Self::BudgetExhausted | Self::RobotsBlocked | Self::NonHtml
        )
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::ParseFailed | Self::Panicked)
    }

    /// Short name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Duplicate => "duplicate",
            Self::AlreadyVisited => "already_visited",
            Self::BudgetExhausted => "budget_exhausted",
            Self::RobotsBlocked => "robots_blocked",
            Self::NonHtml => "non_html",
            Self::FetchFailed => "fetch_failed",
            Self::ParseFailed => "parse_failed",
            Self::Panicked => "panicked",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 9] {
        [
            Self::Saved,
            Self::Duplicate,
            Self::AlreadyVisited,
            Self::BudgetExhausted,
            Self::RobotsBlocked,
            Self::NonHtml,
            Self::FetchFailed,
            Self::ParseFailed,
            Self::Panicked,
        ]
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! State module for tracking crawl progress
//!
//! This module provides the shared state a run's workers coordinate through.
//!
//! # Components
//!
//! - `DedupIndex`: Visited canonical URLs and seen content fingerprints
//! - `RateLimiter`: Minimum gap between requests to the same host
//! - `JobOutcome`: The terminal state of one dequeued job

mod dedup;
mod outcome;
mod rate_limiter;

// Re-export main types
pub use dedup::{ContentFingerprint, DedupIndex};
pub use outcome::JobOutcome;
pub use rate_limiter::RateLimiter;

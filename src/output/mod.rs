//! Output module for saved pages, extractions and run reports
//!
//! This module handles:
//! - Mapping URLs to file paths under the output directory
//! - Rendering extracted signals as JSON, Markdown or plain text
//! - Recording per-outcome statistics and printing the end-of-run report

mod render;
mod save;
pub mod stats;

pub use render::{render_json, render_markdown, render_plain_text};
pub use save::{
    extraction_location, page_location, sanitize, save_extraction, save_page, EXTRACT_DIR,
};
pub use stats::{print_report, CrawlReport, CrawlStats};

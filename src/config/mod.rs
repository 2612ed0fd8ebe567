//! Configuration module for Scrawler
//!
//! This module holds the immutable `CrawlOptions` for a run, the optional TOML
//! options file layered over its defaults, seed-file loading and validation.
//!
//! # Example
//!
//! ```no_run
//! use scrawler::config::{load_options_file, CrawlOptions};
//! use std::path::Path;
//!
//! let mut options = CrawlOptions::default();
//! let file = load_options_file(Path::new("scrawler.toml")).unwrap();
//! file.apply_to(&mut options).unwrap();
//! println!("Crawler will use max depth: {}", options.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlOptions, CrawlSection, ExtractFormat, HttpSection, OptionsFile, OutputSection,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, gather_urls, load_options_file, load_options_file_with_hash,
    load_seed_file, parse_duration,
};
pub use validation::validate;

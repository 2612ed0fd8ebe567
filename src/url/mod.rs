//! URL handling module for Scrawler
//!
//! This module provides URL canonicalization (the dedup key), host and origin
//! extraction, and the crawlable-scheme checks used when following links.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, origin_key, same_host};
pub use normalize::{
    canonicalize_str, canonicalize_url, is_crawlable_scheme, parse_crawlable, CanonicalUrl,
};

//! URL and content deduplication
//!
//! Two independent key spaces, each behind its own lock: canonical URLs that
//! have been claimed for fetching, and fingerprints of page bodies that have
//! been saved.

use crate::url::CanonicalUrl;
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash of a page body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint(pub u64);

impl ContentFingerprint {
    /// Fingerprints raw bytes, one byte at a time in input order
    ///
    /// # Examples
    ///
    /// ```
    /// use scrawler::ContentFingerprint;
    ///
    /// assert_eq!(ContentFingerprint::of(b"").0, 0xcbf29ce484222325);
    /// assert_eq!(ContentFingerprint::of(b"a").0, 0xaf63dc4c8601ec8c);
    /// ```
    pub fn of(bytes: &[u8]) -> Self {
        let hash = bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
        });
        Self(hash)
    }

    /// Lowercase hex rendering, 16 digits
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Visited-URL and seen-content sets for one run
#[derive(Debug, Default)]
pub struct DedupIndex {
    visited: Mutex<HashSet<CanonicalUrl>>,
    content: Mutex<HashSet<ContentFingerprint>>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL visited
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not visited before; the caller owns it
    /// * `false` - Another job already claimed it
    pub fn test_and_set_visited(&self, url: &CanonicalUrl) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(|e| e.into_inner());
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.clone())
    }

    /// Read-only visited check, used to prune links before enqueueing
    pub fn is_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url)
    }

    /// Records a content fingerprint, returning true the first time it is seen
    pub fn test_and_set_content_seen(&self, fingerprint: ContentFingerprint) -> bool {
        self.content
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(fingerprint)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn content_count(&self) -> usize {
        self.content.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

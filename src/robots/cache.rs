//! Per-origin robots.txt cache
//!
//! A policy is fetched lazily on the first request to an origin and kept for
//! the life of the run. Concurrent misses for the same origin may each fetch;
//! the first policy installed wins and later fetches are discarded.

use crate::robots::{fetch_robots, RobotsPolicy};
use crate::url::origin_key;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use url::Url;

/// Memoized robots.txt policies keyed by `scheme://host[:port]`
#[derive(Debug)]
pub struct RobotsCache {
    client: Client,
    user_agent: String,
    policies: Mutex<HashMap<String, Arc<RobotsPolicy>>>,
}

impl RobotsCache {
    /// Creates an empty cache that fetches with the given client and user agent
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            policies: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the policy for a URL's origin, fetching it on first use
    ///
    /// The network fetch happens with no lock held.
    pub async fn policy_for(&self, url: &Url) -> Arc<RobotsPolicy> {
        let origin = origin_key(url);

        if let Some(policy) = self.lookup(&origin) {
            return policy;
        }

        let fetched = Arc::new(fetch_robots(&self.client, &origin, &self.user_agent).await);

        let mut policies = self.policies.lock().unwrap_or_else(|e| e.into_inner());
        let installed = policies.entry(origin.clone()).or_insert(fetched);
        debug!("Robots policy cached for {}", origin);
        Arc::clone(installed)
    }

    /// Checks whether the crawler may fetch a URL
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL about to be fetched
    /// * `user_agent` - The user agent to evaluate rules for
    ///
    /// # Returns
    ///
    /// * `true` - If robots.txt allows the URL (or could not be fetched)
    /// * `false` - If robots.txt disallows the URL
    pub async fn is_allowed(&self, url: &Url, user_agent: &str) -> bool {
        let policy = self.policy_for(url).await;
        let path = url.path();
        policy.is_allowed(user_agent, if path.is_empty() { "/" } else { path })
    }

    /// Number of origins with a cached policy
    pub fn len(&self) -> usize {
        self.policies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Returns true when no policy has been cached yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, origin: &str) -> Option<Arc<RobotsPolicy>> {
        self.policies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(origin)
            .cloned()
    }
}

//! Robots.txt parser and rule evaluation
//!
//! Rules are grouped by lowercased user agent. Every `Allow`/`Disallow` line is
//! recorded under the group it appears in and also under the `*` group, so the
//! default group always carries every rule in the file.

use std::collections::HashMap;

/// Default user-agent group
pub const WILDCARD_AGENT: &str = "*";

/// A single allow or disallow rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotRule {
    /// `true` for `Allow`, `false` for `Disallow`
    pub allow: bool,
    /// Path prefix the rule applies to
    pub path: String,
}

impl RobotRule {
    /// Checks whether the rule covers a request path
    ///
    /// Matching is boundary-aware: a rule for `/jobs` covers `/jobs` and
    /// `/jobs/...` but not `/jobs2`. Empty rule paths never match.
    pub fn matches(&self, path: &str) -> bool {
        if self.path.is_empty() {
            return false;
        }
        if path == self.path {
            return true;
        }
        let mut prefix = self.path.trim_end_matches('/').to_string();
        prefix.push('/');
        path.starts_with(&prefix)
    }
}

/// Parsed robots.txt policy for one origin
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    /// Rules by lowercased user agent, `*` for the default group
    groups: HashMap<String, Vec<RobotRule>>,
}

impl RobotsPolicy {
    /// Creates a permissive policy with an empty default group
    ///
    /// This is what gets cached when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        let mut groups = HashMap::new();
        groups.insert(WILDCARD_AGENT.to_string(), Vec::new());
        Self { groups }
    }

    /// Parses robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    ///
    /// # Returns
    ///
    /// A policy that never fails to build; unknown or malformed lines are ignored
    pub fn from_content(content: &str) -> Self {
        let mut policy = Self::allow_all();
        let mut current: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    let agent = value.to_lowercase();
                    policy.groups.entry(agent.clone()).or_default();
                    current = Some(agent);
                }
                "allow" | "disallow" => {
                    let rule = RobotRule {
                        allow: key == "allow",
                        path: value.to_string(),
                    };
                    policy.push_rule(current.as_deref(), rule);
                }
                _ => {}
            }
        }

        policy
    }

    fn push_rule(&mut self, current: Option<&str>, rule: RobotRule) {
        if let Some(agent) = current {
            if agent != WILDCARD_AGENT {
                self.groups
                    .entry(agent.to_string())
                    .or_default()
                    .push(rule.clone());
            }
        }
        self.groups
            .entry(WILDCARD_AGENT.to_string())
            .or_default()
            .push(rule);
    }

    /// Returns the rules recorded for a user-agent group
    pub fn rules_for(&self, user_agent: &str) -> &[RobotRule] {
        self.groups
            .get(user_agent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Checks if a path is allowed for the given user agent
    ///
    /// The agent's own group is consulted first, then `*`. The longest matching
    /// rule path wins and `Disallow` wins a tie. No match means allowed.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The user agent string (case-insensitive; empty means `*`)
    /// * `path` - The escaped request path (e.g., "/page.html")
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        let mut agent = user_agent.trim().to_lowercase();
        if agent.is_empty() {
            agent = WILDCARD_AGENT.to_string();
        }

        let mut best = 0usize;
        let mut allowed = true;

        let own = if agent == WILDCARD_AGENT {
            &[][..]
        } else {
            self.rules_for(&agent)
        };

        for rule in own.iter().chain(self.rules_for(WILDCARD_AGENT)) {
            if !rule.matches(path) {
                continue;
            }
            let len = rule.path.len();
            if len > best {
                best = len;
                allowed = rule.allow;
            } else if len == best && allowed && !rule.allow {
                allowed = false;
            }
        }

        allowed
    }
}

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Account identifier of an official bot
pub type TrustedBotIdentity = String;

/// Set of official bot identities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    identities: HashSet<TrustedBotIdentity>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: impl Into<TrustedBotIdentity>) -> bool {
        self.identities.insert(identity.into())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl<S: Into<TrustedBotIdentity>> FromIterator<S> for Registry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            identities: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Registry plus the moment it was fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCacheEntry {
    pub registry: Registry,
    /// Unix seconds
    pub fetched_at: i64,
}

impl RegistryCacheEntry {
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp() - self.fetched_at
    }

    /// Fresh while strictly younger than the threshold
    pub fn is_fresh(&self, now: DateTime<Utc>, staleness_secs: u64) -> bool {
        let age = self.age_secs(now);
        age < staleness_secs as i64
    }

    pub fn fetched_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.fetched_at, 0).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn membership_is_idempotent() {
        let mut registry = Registry::new();
        assert!(registry.insert("76561198000000001"));
        assert!(!registry.insert("76561198000000001"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("76561198000000001"));
        assert!(registry.contains("76561198000000001"));
        assert!(!registry.contains("76561198099999999"));
    }

    #[test]
    fn serializes_as_plain_array() {
        let registry: Registry = ["76561198000000001"].into_iter().collect();
        let json = serde_json::to_string(&registry).unwrap();
        assert_eq!(json, r#"["76561198000000001"]"#);

        let back: Registry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }

    #[test]
    fn freshness_boundary_is_exclusive() {
        let now = Utc::now();
        let week = 7 * 24 * 3600;
        let entry = RegistryCacheEntry {
            registry: Registry::new(),
            fetched_at: (now - Duration::seconds(week)).timestamp(),
        };
        assert!(!entry.is_fresh(now, week as u64));

        let entry = RegistryCacheEntry {
            fetched_at: (now - Duration::hours(1)).timestamp(),
            ..entry
        };
        assert!(entry.is_fresh(now, week as u64));
    }
}

//! Cached registry of official bot identities
//!
//! The registry page changes rarely, so it is fetched at most once per
//! staleness window (seven days by default) and otherwise served from the
//! key-value store:
//! - `registryCache` holds the serialized registry (JSON string)
//! - `registryCacheFetchedAt` holds the fetch time in unix seconds
//!
//! Fetch and parse failures are returned to the caller as-is. Stale or empty
//! data is never substituted, and there is no retry.
//!
//! Two callers that both observe a stale entry will both refresh; nothing
//! serializes refreshes.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::{parse_bot_table, KeyValueStore, PageFetcher};
use crate::config::RegistryConfig;
use crate::domain::{Registry, RegistryCacheEntry};
use crate::error::Result;

pub const REGISTRY_KEY: &str = "registryCache";
pub const FETCHED_AT_KEY: &str = "registryCacheFetchedAt";

/// Snapshot of the cache without touching the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub entries: Option<usize>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_secs: Option<i64>,
    pub fresh: bool,
}

pub struct RegistryCache {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn KeyValueStore>,
    source_url: String,
    staleness_secs: u64,
}

impl RegistryCache {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn KeyValueStore>,
        config: &RegistryConfig,
    ) -> Self {
        Self {
            fetcher,
            store,
            source_url: config.url.clone(),
            staleness_secs: config.staleness_secs,
        }
    }

    /// Cached registry if fresh, otherwise a freshly fetched one
    pub async fn get_registry(&self) -> Result<Registry> {
        let now = Utc::now();

        if let Some(entry) = self.read_entry().await? {
            if entry.is_fresh(now, self.staleness_secs) {
                debug!(
                    entries = entry.registry.len(),
                    age_secs = entry.age_secs(now),
                    "Using cached registry"
                );
                return Ok(entry.registry);
            }
            info!(
                age_secs = entry.age_secs(now),
                "Cached registry is stale, refreshing"
            );
        } else {
            info!("No cached registry, fetching");
        }

        self.refresh().await
    }

    /// Fetch, parse and persist the registry regardless of cache age
    pub async fn refresh(&self) -> Result<Registry> {
        let html = self.fetcher.fetch_text(&self.source_url).await?;
        let registry = parse_bot_table(&html)?;

        let now = Utc::now().timestamp();
        let serialized = serde_json::to_string(&registry)?;
        self.store
            .set(REGISTRY_KEY, Value::String(serialized), None)
            .await?;
        self.store.set(FETCHED_AT_KEY, Value::from(now), None).await?;

        info!(
            entries = registry.len(),
            source = %self.source_url,
            "Registry refreshed"
        );
        Ok(registry)
    }

    pub async fn status(&self) -> Result<CacheStatus> {
        let now = Utc::now();
        Ok(match self.read_entry().await? {
            Some(entry) => CacheStatus {
                entries: Some(entry.registry.len()),
                fetched_at: entry.fetched_at_utc(),
                age_secs: Some(entry.age_secs(now)),
                fresh: entry.is_fresh(now, self.staleness_secs),
            },
            None => CacheStatus {
                entries: None,
                fetched_at: None,
                age_secs: None,
                fresh: false,
            },
        })
    }

    /// Missing or undecodable values read as an empty cache
    async fn read_entry(&self) -> Result<Option<RegistryCacheEntry>> {
        let raw = match self.store.get(REGISTRY_KEY).await? {
            Some(Value::String(raw)) => raw,
            Some(other) => {
                warn!("Ignoring cached registry of unexpected type: {}", other);
                return Ok(None);
            }
            None => return Ok(None),
        };

        let registry: Registry = match serde_json::from_str(&raw) {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Ignoring undecodable cached registry: {}", e);
                return Ok(None);
            }
        };

        let fetched_at = self
            .store
            .get(FETCHED_AT_KEY)
            .await?
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        Ok(Some(RegistryCacheEntry {
            registry,
            fetched_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockPageFetcher;
    use crate::adapters::MemoryStore;
    use crate::error::GuardError;
    use chrono::Duration;

    const PAGE: &str = r#"<table class="table table-bordered"><tbody>
        <tr><td>Bot 1</td><td>76561198000000001</td></tr>
        <tr><td>Bot 2</td><td>76561198000000002</td></tr>
    </tbody></table>"#;

    async fn seed(store: &MemoryStore, ids: &[&str], fetched_at: i64) {
        let registry: Registry = ids.iter().copied().collect();
        store
            .set(
                REGISTRY_KEY,
                Value::String(serde_json::to_string(&registry).unwrap()),
                None,
            )
            .await
            .unwrap();
        store
            .set(FETCHED_AT_KEY, Value::from(fetched_at), None)
            .await
            .unwrap();
    }

    fn cache(fetcher: MockPageFetcher, store: Arc<MemoryStore>) -> RegistryCache {
        RegistryCache::new(Arc::new(fetcher), store, &RegistryConfig::default())
    }

    #[tokio::test]
    async fn stale_entry_triggers_exactly_one_fetch() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["76561198000000009"], (Utc::now() - Duration::days(8)).timestamp()).await;

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(1)
            .returning(|_| Ok(PAGE.to_string()));

        let registry = cache(fetcher, store.clone()).get_registry().await.unwrap();
        assert!(registry.contains("76561198000000001"));
        assert!(!registry.contains("76561198000000009"));

        let fetched_at = store.get(FETCHED_AT_KEY).await.unwrap().unwrap();
        assert!(Utc::now().timestamp() - fetched_at.as_i64().unwrap() < 60);
    }

    #[tokio::test]
    async fn fresh_entry_is_returned_without_fetching() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["76561198000000009"], (Utc::now() - Duration::hours(1)).timestamp()).await;

        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch_text().times(0);

        let registry = cache(fetcher, store).get_registry().await.unwrap();
        let expected: Registry = ["76561198000000009"].into_iter().collect();
        assert_eq!(registry, expected);
    }

    #[tokio::test]
    async fn missing_timestamp_counts_as_stale() {
        let store = Arc::new(MemoryStore::new());
        let registry: Registry = ["76561198000000009"].into_iter().collect();
        store
            .set(
                REGISTRY_KEY,
                Value::String(serde_json::to_string(&registry).unwrap()),
                None,
            )
            .await
            .unwrap();

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(1)
            .returning(|_| Ok(PAGE.to_string()));

        cache(fetcher, store).get_registry().await.unwrap();
    }

    #[tokio::test]
    async fn fetch_failure_is_not_replaced_by_stale_data() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["76561198000000009"], (Utc::now() - Duration::days(8)).timestamp()).await;

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(1)
            .returning(|_| Err(GuardError::NetworkFailure("connection refused".into())));

        let err = cache(fetcher, store.clone()).get_registry().await.unwrap_err();
        assert!(matches!(err, GuardError::NetworkFailure(_)));

        // Stale entry left untouched
        let status = RegistryCache::new(
            Arc::new(MockPageFetcher::new()),
            store,
            &RegistryConfig::default(),
        )
        .status()
        .await
        .unwrap();
        assert_eq!(status.entries, Some(1));
        assert!(!status.fresh);
    }

    #[tokio::test]
    async fn malformed_page_is_reported() {
        let store = Arc::new(MemoryStore::new());
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch_text()
            .returning(|_| Ok("<html><body>Cloudflare</body></html>".to_string()));

        let err = cache(fetcher, store.clone()).get_registry().await.unwrap_err();
        assert!(matches!(err, GuardError::MalformedResponse(_)));
        assert_eq!(store.get(REGISTRY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn undecodable_cache_is_refetched() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(REGISTRY_KEY, Value::String("{oops".into()), None)
            .await
            .unwrap();
        store
            .set(FETCHED_AT_KEY, Value::from(Utc::now().timestamp()), None)
            .await
            .unwrap();

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(1)
            .returning(|_| Ok(PAGE.to_string()));

        let registry = cache(fetcher, store).get_registry().await.unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn status_of_empty_cache() {
        let status = cache(MockPageFetcher::new(), Arc::new(MemoryStore::new()))
            .status()
            .await
            .unwrap();
        assert_eq!(status.entries, None);
        assert!(!status.fresh);
    }
}

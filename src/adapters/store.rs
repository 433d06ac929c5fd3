//! Key-value persistence with optional per-key time-to-live.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{GuardError, Result};

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Missing and expired keys both read as `None`
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    fn new(value: Value, ttl: Option<Duration>) -> Result<Self> {
        let expires_at = match ttl {
            Some(ttl) => {
                let ttl = chrono::Duration::from_std(ttl)
                    .map_err(|e| GuardError::Storage(format!("invalid ttl: {}", e)))?;
                Some(Utc::now() + ttl)
            }
            None => None,
        };
        Ok(Self { value, expires_at })
    }

    fn live_value(&self, now: DateTime<Utc>) -> Option<&Value> {
        match self.expires_at {
            Some(at) if at <= now => None,
            _ => Some(&self.value),
        }
    }
}

/// In-process store, lost on exit
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .and_then(|e| e.live_value(Utc::now()))
            .cloned())
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let stored = StoredValue::new(value, ttl)?;
        self.entries.write().await.insert(key.to_string(), stored);
        Ok(())
    }
}

/// Store backed by a single JSON file, rewritten on every `set`
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, StoredValue>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), "Store file unreadable, starting empty: {}", e);
                Ok(HashMap::new())
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        let entries = self.load().await?;
        Ok(entries
            .get(key)
            .and_then(|e| e.live_value(Utc::now()))
            .cloned())
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;

        let now = Utc::now();
        entries.retain(|_, e| e.live_value(now).is_some());
        entries.insert(key.to_string(), StoredValue::new(value, ttl)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let raw = serde_json::to_string_pretty(&entries)?;
        tokio::fs::write(&self.path, raw).await?;
        debug!(key, path = %self.path.display(), "Stored value");
        Ok(())
    }
}

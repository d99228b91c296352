//! Local cache port.
//!
//! Two advisory entries survive between runs: the last session id and the
//! last settings snapshot. Losing either is harmless.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::StoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    SessionId,
    LastSettings,
}

impl CacheKey {
    pub fn name(self) -> &'static str {
        match self {
            CacheKey::SessionId => "sessionid",
            CacheKey::LastSettings => "lastsettings",
        }
    }
}

pub trait LocalCache {
    fn get(&self, key: CacheKey) -> StoreResult<Option<String>>;

    fn set(&self, key: CacheKey, value: &str) -> StoreResult<()>;

    fn clear(&self, key: CacheKey) -> StoreResult<()>;
}

impl<T: LocalCache + ?Sized> LocalCache for &T {
    fn get(&self, key: CacheKey) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: CacheKey, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn clear(&self, key: CacheKey) -> StoreResult<()> {
        (**self).clear(key)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    value: String,
    stored_at: DateTime<Utc>,
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    root_dir: PathBuf,
}

impl FileCache {
    pub fn new(root_dir: PathBuf) -> StoreResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn path(&self, key: CacheKey) -> PathBuf {
        self.root_dir.join(format!("{}.json", key.name()))
    }

    fn record(&self, key: CacheKey) -> StoreResult<Option<CacheRecord>> {
        let path = self.path(key);
        if !path.exists() {
            debug!(key = key.name(), "cache miss");
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// When the entry was last written.
    pub fn stored_at(&self, key: CacheKey) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self.record(key)?.map(|r| r.stored_at))
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: CacheKey) -> StoreResult<Option<String>> {
        Ok(self.record(key)?.map(|r| r.value))
    }

    fn set(&self, key: CacheKey, value: &str) -> StoreResult<()> {
        let record = CacheRecord {
            value: value.to_string(),
            stored_at: Utc::now(),
        };
        fs::write(self.path(key), serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }

    fn clear(&self, key: CacheKey) -> StoreResult<()> {
        let path = self.path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: CacheKey) -> StoreResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned())
    }

    fn set(&self, key: CacheKey, value: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_string());
        Ok(())
    }

    fn clear(&self, key: CacheKey) -> StoreResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }
}

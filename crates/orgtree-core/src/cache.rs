//! Cache collaborator for single-row lookups.
//!
//! Values are stored as serialized JSON strings so any key-value backend
//! can sit behind [`CacheStore`]. [`MemoryCache`] is the in-process
//! implementation.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use thiserror::Error;

use crate::models::organization::OrganizationId;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Key-value cache with best-effort semantics.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), CacheError>> + Send;
    /// Removes every key; missing keys are not an error.
    fn delete(&self, keys: &[String]) -> impl Future<Output = Result<(), CacheError>> + Send;
}

impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).set(key, value)
    }

    fn delete(&self, keys: &[String]) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).delete(keys)
    }
}

/// Builds cache keys from a fixed prefix and an organization id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn organization(&self, id: OrganizationId) -> String {
        format!("{}{}", self.prefix, id)
    }

    pub fn organizations(&self, ids: &[OrganizationId]) -> Vec<String> {
        ids.iter().map(|id| self.organization(*id)).collect()
    }
}

/// Bounded in-process LRU cache.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, String>>,
}

impl MemoryCache {
    /// A zero capacity is bumped to one entry.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Presence check that does not promote the entry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }
}

impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.lock().put(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut entries = self.entries.lock();
        for key in keys {
            entries.pop(key.as_str());
        }
        Ok(())
    }
}

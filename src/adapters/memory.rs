//! In-memory cache store.
//!
//! Satisfies the [`CacheStore`] contract without any external service. Used
//! by tests and by callers embedding the engine in a single process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;

use super::CacheStore;

/// A value held by the cache
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Scalar(f64),
    Json(serde_json::Value),
}

impl CacheValue {
    /// Scalar payload, if this is a scalar entry
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            Self::Json(_) => None,
        }
    }
}

/// Cache store backed by a `HashMap<key, value>`
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheValue>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheValue>> {
        // A panicked writer cannot leave a half-written entry behind
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        self.entries().get(key).cloned()
    }

    /// Scalar stored under `key`
    pub fn get_scalar(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|value| value.as_scalar())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set(&self, key: &str, value: f64) -> Result<()> {
        self.entries()
            .insert(key.to_string(), CacheValue::Scalar(value));
        Ok(())
    }

    async fn set_json(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.entries()
            .insert(key.to_string(), CacheValue::Json(value.clone()));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        let mut entries = self.entries();
        Ok(keys.iter().filter(|key| entries.remove(*key).is_some()).count())
    }
}

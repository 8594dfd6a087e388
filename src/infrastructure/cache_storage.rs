//! In-memory named response caches.

use crate::application::ports::{CacheStorage, StorageError};
use crate::domain::fetch::{CacheKey, Response};
use ahash::RandomState;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;

/// Response caches keyed by cache name, then by request identity.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: DashMap<String, HashMap<CacheKey, Response>, RandomState>,
}

impl MemoryCacheStorage {
    /// Create an empty cache storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in one cache (0 if it does not exist).
    pub fn entry_count(&self, cache_name: &str) -> usize {
        self.caches.get(cache_name).map_or(0, |cache| cache.len())
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn put(&self, cache_name: &str, key: CacheKey, response: Response) -> Result<(), StorageError> {
        self.caches
            .entry(cache_name.to_string())
            .or_default()
            .insert(key, response);
        Ok(())
    }

    async fn lookup(&self, cache_name: &str, key: &CacheKey) -> Result<Option<Response>, StorageError> {
        Ok(self
            .caches
            .get(cache_name)
            .and_then(|cache| cache.get(key).cloned()))
    }

    async fn cache_names(&self) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self.caches.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn delete_cache(&self, cache_name: &str) -> Result<bool, StorageError> {
        Ok(self.caches.remove(cache_name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_lookup() {
        let storage = MemoryCacheStorage::new();
        let key = CacheKey::get("/styles/globals.css");

        assert_eq!(storage.lookup("autoflow-v1", &key).await.unwrap(), None);

        storage.put("autoflow-v1", key.clone(), Response::ok("body{}")).await.unwrap();
        storage.put("autoflow-v1", key.clone(), Response::ok("body{margin:0}")).await.unwrap();

        let hit = storage.lookup("autoflow-v1", &key).await.unwrap().unwrap();
        assert_eq!(&hit.body[..], b"body{margin:0}");
        assert_eq!(storage.entry_count("autoflow-v1"), 1);
        // Caches are isolated by name
        assert_eq!(storage.lookup("autoflow-v2", &key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_cache() {
        let storage = MemoryCacheStorage::new();
        storage.put("b", CacheKey::get("/"), Response::ok("")).await.unwrap();
        storage.put("a", CacheKey::get("/"), Response::ok("")).await.unwrap();

        assert_eq!(storage.cache_names().await.unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert!(storage.delete_cache("a").await.unwrap());
        assert!(!storage.delete_cache("a").await.unwrap());
        assert_eq!(storage.cache_names().await.unwrap(), vec!["b".to_string()]);
    }
}

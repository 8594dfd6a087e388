//! Storage implementations for rate-limit windows.
//!
//! Provides concurrent, sharded storage for per-key state.

use crate::application::ports::Storage;
use ahash::RandomState;
use dashmap::DashMap;
use std::hash::Hash;

/// Thread-safe sharded storage backed by DashMap.
///
/// DashMap provides lock-free reads and fine-grained locking for writes.
/// Entry access holds the shard lock, which is what makes a window's
/// check-then-record step atomic per key.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    map: DashMap<K, V, RandomState>,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a new sharded storage instance.
    pub fn new() -> Self {
        Self {
            map: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Insert or update a value.
    pub fn insert(&self, key: K, value: V) {
        self.map.insert(key, value);
    }

    /// Get a reference to a value.
    pub fn get<Q>(&self, key: &Q) -> Option<dashmap::mapref::one::Ref<'_, K, V>>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key)
    }

    /// Check if a key exists.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// Implement the Storage port
impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        let entry = self.map.entry(key);
        let mut value_ref = entry.or_insert_with(factory);
        accessor(&mut value_ref)
    }

    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        self.map.get_mut(key).map(|mut value_ref| accessor(&mut value_ref))
    }

    fn remove(&self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.retain(f);
    }
}

// Implement Storage for Arc<ShardedStorage> to allow it to be used directly
impl<K, V> Storage<K, V> for std::sync::Arc<ShardedStorage<K, V>>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_entry_mut(key, factory, accessor)
    }

    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_existing_mut(key, accessor)
    }

    fn remove(&self, key: &K) -> bool {
        Storage::remove(&**self, key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn clear(&self) {
        Storage::clear(&**self)
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        Storage::retain(&**self, f)
    }
}

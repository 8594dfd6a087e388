//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::fetch::{CacheKey, Request, Response};
use crate::domain::push::Notification;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Port for obtaining current time.
///
/// Monotonic time drives window accounting; wall-clock time is only used to
/// stamp persisted records. Infrastructure provides concrete implementations
/// (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current monotonic instant.
    fn now(&self) -> Instant;

    /// Get the current wall-clock time.
    fn utc_now(&self) -> DateTime<Utc>;
}

/// Port for concurrent key-value storage of in-memory state.
///
/// Infrastructure provides a concrete implementation (ShardedStorage).
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// The accessor runs while the entry is locked, so read-modify-write
    /// sequences inside it are atomic with respect to other callers.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `factory` - Function to create a new value if the key doesn't exist
    /// * `accessor` - Function that gets mutable access to the value
    ///
    /// # Returns
    /// The result from the accessor function
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Access an existing entry without creating one.
    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R;

    /// Remove an entry. Returns true if it existed.
    fn remove(&self, key: &K) -> bool;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// Error from a storage adapter.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying I/O failed
    Io(std::io::Error),
    /// Stored data could not be (de)serialized
    Serialization(serde_json::Error),
    /// The backend refused the operation (quota, disabled storage, ...)
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage I/O error: {}", e),
            StorageError::Serialization(e) => write!(f, "storage serialization error: {}", e),
            StorageError::Unavailable(reason) => write!(f, "storage unavailable: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(e) => Some(e),
            StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e)
    }
}

/// Port for durable string key-value storage (the consent record lives here).
///
/// Synchronous on purpose: writes complete before the caller continues, so
/// anything notified afterwards observes the written value.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Port for named response caches.
#[async_trait]
pub trait CacheStorage: Send + Sync + Debug {
    /// Store a response in the named cache, creating the cache if needed.
    async fn put(&self, cache_name: &str, key: CacheKey, response: Response)
        -> Result<(), StorageError>;

    /// Look up a response in the named cache.
    async fn lookup(&self, cache_name: &str, key: &CacheKey)
        -> Result<Option<Response>, StorageError>;

    /// Names of all existing caches.
    async fn cache_names(&self) -> Result<Vec<String>, StorageError>;

    /// Delete a whole cache. Returns true if it existed.
    async fn delete_cache(&self, cache_name: &str) -> Result<bool, StorageError>;
}

/// Error from a network fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not be completed (offline, DNS, connection reset)
    Network(String),
    /// The request did not complete within the configured bound
    Timeout(Duration),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(reason) => write!(f, "network error: {}", reason),
            FetchError::Timeout(after) => write!(f, "request timed out after {:?}", after),
        }
    }
}

impl std::error::Error for FetchError {}

/// Port for performing network requests.
///
/// Any HTTP status, including 4xx and 5xx, is a successful fetch; only a
/// request that produced no response at all is an error.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    /// Perform `request` and return whatever response the server sent.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Port for displaying notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync + Debug {
    /// Display a notification.
    async fn show(&self, notification: &Notification);

    /// Remove a displayed notification.
    async fn close(&self, notification: &Notification);
}

/// An open client window the worker can focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientWindow {
    /// Opaque window identifier
    pub id: String,
    /// URL currently shown in the window
    pub url: String,
}

/// Port for enumerating, focusing and opening client windows.
#[async_trait]
pub trait ClientWindows: Send + Sync + Debug {
    /// Windows currently controlled by the worker.
    async fn windows(&self) -> Vec<ClientWindow>;

    /// Bring an existing window to the front. Returns false if it is gone.
    async fn focus(&self, id: &str) -> bool;

    /// Open a new window at `url`.
    async fn open(&self, url: &str);
}

//! Offline cache worker.
//!
//! Precaches the app shell on install, purges older cache generations on
//! activate, and serves GET requests network-first with the cache as a
//! fallback.

use crate::application::ports::{CacheStorage, FetchError, Fetcher, StorageError};
use crate::domain::fetch::{CacheKey, Request, Response};
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Error returned when worker configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerConfigError {
    /// Cache prefix must not be empty
    EmptyPrefix,
    /// Cache version must not be empty
    EmptyVersion,
    /// The offline page is served from the cache, so it has to be precached
    OfflinePageNotPrecached(String),
}

impl fmt::Display for WorkerConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerConfigError::EmptyPrefix => write!(f, "cache prefix must not be empty"),
            WorkerConfigError::EmptyVersion => write!(f, "cache version must not be empty"),
            WorkerConfigError::OfflinePageNotPrecached(page) => {
                write!(f, "offline page '{}' is not in the precache list", page)
            }
        }
    }
}

impl std::error::Error for WorkerConfigError {}

/// Cache worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// First half of the cache name
    pub cache_prefix: String,
    /// Cache generation; bumping it purges older caches on activation
    pub version: String,
    /// URLs fetched and stored on install
    pub precache: Vec<String>,
    /// Page served to navigations when both network and cache miss
    pub offline_page: String,
    /// Upper bound on a network attempt, in milliseconds; unbounded if unset
    pub network_timeout_ms: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_prefix: "autoflow".to_string(),
            version: "v1".to_string(),
            precache: [
                "/",
                "/offline.html",
                "/manifest.json",
                "/styles/globals.css",
                "/scripts/app.js",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            offline_page: "/offline.html".to_string(),
            network_timeout_ms: None,
        }
    }
}

impl WorkerConfig {
    /// Name of the current cache generation, `<prefix>-<version>`.
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.version)
    }

    /// Network timeout, if one is configured.
    pub fn network_timeout(&self) -> Option<Duration> {
        self.network_timeout_ms.map(Duration::from_millis)
    }

    /// Bound network attempts by `timeout`.
    pub fn with_network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    /// Returns `WorkerConfigError` describing the first problem found.
    pub fn validate(&self) -> Result<(), WorkerConfigError> {
        if self.cache_prefix.is_empty() {
            return Err(WorkerConfigError::EmptyPrefix);
        }
        if self.version.is_empty() {
            return Err(WorkerConfigError::EmptyVersion);
        }
        if !self.precache.iter().any(|url| url == &self.offline_page) {
            return Err(WorkerConfigError::OfflinePageNotPrecached(
                self.offline_page.clone(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle state of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created, install not started
    Parsed,
    /// Precaching
    Installing,
    /// Precache complete, waiting for activation
    Installed,
    /// Purging old caches
    Activating,
    /// Intercepting requests
    Activated,
    /// Install failed; this worker will never activate
    Redundant,
}

/// Error from the worker lifecycle.
#[derive(Debug)]
pub enum WorkerError {
    /// Configuration is invalid
    Config(WorkerConfigError),
    /// A precache URL could not be fetched with a 200
    Precache { url: String, reason: String },
    /// `install` called after the worker left `Parsed`
    AlreadyInstalled(WorkerState),
    /// `activate` called while not installed
    NotInstalled(WorkerState),
    /// The cache backend failed
    Storage(StorageError),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::Config(e) => write!(f, "invalid worker config: {}", e),
            WorkerError::Precache { url, reason } => {
                write!(f, "failed to precache '{}': {}", url, reason)
            }
            WorkerError::AlreadyInstalled(state) => {
                write!(f, "worker cannot install from state {:?}", state)
            }
            WorkerError::NotInstalled(state) => {
                write!(f, "worker cannot activate from state {:?}", state)
            }
            WorkerError::Storage(e) => write!(f, "cache storage failed: {}", e),
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkerError::Config(e) => Some(e),
            WorkerError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WorkerConfigError> for WorkerError {
    fn from(e: WorkerConfigError) -> Self {
        WorkerError::Config(e)
    }
}

impl From<StorageError> for WorkerError {
    fn from(e: StorageError) -> Self {
        WorkerError::Storage(e)
    }
}

/// Network-first cache worker.
///
/// # Example
/// ```
/// # tokio_test_block_on(async {
/// use client_governance::{MemoryCacheStorage, OfflineWorker, Request, WorkerConfig};
/// use client_governance::mocks::MockFetcher;
/// use std::sync::Arc;
///
/// let fetcher = Arc::new(MockFetcher::serving_ok());
/// let worker = OfflineWorker::new(
///     WorkerConfig::default(),
///     fetcher.clone(),
///     Arc::new(MemoryCacheStorage::new()),
/// )
/// .unwrap();
///
/// worker.install().await.unwrap();
/// worker.activate().await.unwrap();
///
/// fetcher.go_offline();
/// let response = worker.handle_fetch(&Request::get("/scripts/app.js")).await.unwrap();
/// assert_eq!(response.status, 200);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct OfflineWorker<F, C>
where
    F: Fetcher + ?Sized,
    C: CacheStorage + ?Sized,
{
    config: WorkerConfig,
    cache_name: String,
    fetcher: Arc<F>,
    caches: Arc<C>,
    state: Mutex<WorkerState>,
}

impl<F, C> OfflineWorker<F, C>
where
    F: Fetcher + ?Sized,
    C: CacheStorage + ?Sized,
{
    /// Create a worker in the `Parsed` state.
    ///
    /// # Errors
    /// Returns `WorkerError::Config` if the configuration is invalid.
    pub fn new(config: WorkerConfig, fetcher: Arc<F>, caches: Arc<C>) -> Result<Self, WorkerError> {
        config.validate()?;
        Ok(Self {
            cache_name: config.cache_name(),
            config,
            fetcher,
            caches,
            state: Mutex::new(WorkerState::Parsed),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Name of the cache this worker reads and writes.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Configuration this worker was created with.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Precache the configured URLs.
    ///
    /// All responses are fetched before anything is written, so a failed
    /// install leaves the cache untouched. On failure the worker becomes
    /// `Redundant`.
    ///
    /// # Errors
    /// Returns `WorkerError::AlreadyInstalled` unless the worker is `Parsed`.
    pub async fn install(&self) -> Result<(), WorkerError> {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != WorkerState::Parsed {
                return Err(WorkerError::AlreadyInstalled(*state));
            }
            *state = WorkerState::Installing;
        }

        match self.precache().await {
            Ok(count) => {
                self.set_state(WorkerState::Installed);
                tracing::info!(cache = %self.cache_name, entries = count, "worker installed");
                Ok(())
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant);
                tracing::warn!(cache = %self.cache_name, error = %e, "worker install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, WorkerError> {
        let mut fetched = Vec::with_capacity(self.config.precache.len());

        for url in &self.config.precache {
            let request = Request::get(url.as_str());
            let response = self
                .fetch_with_timeout(&request)
                .await
                .map_err(|e| WorkerError::Precache {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

            if !response.is_cacheable() {
                return Err(WorkerError::Precache {
                    url: url.clone(),
                    reason: format!("unexpected status {}", response.status),
                });
            }
            fetched.push((CacheKey::get(url.as_str()), response));
        }

        let count = fetched.len();
        for (key, response) in fetched {
            self.caches.put(&self.cache_name, key, response).await?;
        }
        Ok(count)
    }

    /// Delete every cache generation other than the current one.
    ///
    /// Returns the names of the deleted caches.
    ///
    /// # Errors
    /// Returns `WorkerError::NotInstalled` unless the worker is `Installed`.
    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != WorkerState::Installed {
                return Err(WorkerError::NotInstalled(*state));
            }
            *state = WorkerState::Activating;
        }

        let result = self.purge_old_caches().await;
        match result {
            Ok(deleted) => {
                self.set_state(WorkerState::Activated);
                tracing::info!(cache = %self.cache_name, purged = ?deleted, "worker activated");
                Ok(deleted)
            }
            Err(e) => {
                // Activation can be retried
                self.set_state(WorkerState::Installed);
                Err(e)
            }
        }
    }

    async fn purge_old_caches(&self) -> Result<Vec<String>, WorkerError> {
        let mut deleted = Vec::new();
        for name in self.caches.cache_names().await? {
            if name == self.cache_name {
                continue;
            }
            if self.caches.delete_cache(&name).await? {
                tracing::debug!(cache = %name, "deleted old cache");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Intercept a request.
    ///
    /// GET requests always resolve to `Ok` once the worker is active; the
    /// error case is only reachable for pass-through requests.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let key = match request.cache_key() {
            Some(key) if self.state() == WorkerState::Activated => key,
            _ => return self.fetcher.fetch(request).await,
        };

        match self.fetch_with_timeout(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    if let Err(e) = self
                        .caches
                        .put(&self.cache_name, key, response.clone())
                        .await
                    {
                        tracing::warn!(url = %request.url, error = %e, "failed to cache response");
                    }
                }
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "network failed, falling back to cache");
                Ok(self.fallback(request, &key).await)
            }
        }
    }

    async fn fetch_with_timeout(&self, request: &Request) -> Result<Response, FetchError> {
        let Some(limit) = self.config.network_timeout() else {
            return self.fetcher.fetch(request).await;
        };

        match tokio::time::timeout(limit, self.fetcher.fetch(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(url = %request.url, timeout = ?limit, "network request timed out");
                Err(FetchError::Timeout(limit))
            }
        }
    }

    async fn fallback(&self, request: &Request, key: &CacheKey) -> Response {
        if let Some(cached) = self.cached(key).await {
            return cached;
        }

        if request.is_navigation() {
            let offline_key = CacheKey::get(self.config.offline_page.as_str());
            if let Some(page) = self.cached(&offline_key).await {
                return page;
            }
        }

        Response::offline()
    }

    async fn cached(&self, key: &CacheKey) -> Option<Response> {
        match self.caches.lookup(&self.cache_name, key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache lookup failed");
                None
            }
        }
    }
}

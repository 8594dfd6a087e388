//! Central registry of sliding windows, one per rate-limit key.
//!
//! The registry owns the per-operation window configuration and creates a
//! window with the right configuration the first time a key is seen.

use crate::application::ports::{Clock, Storage};
use crate::domain::{
    operation::{OperationKind, RateLimitKey},
    window::{SlidingWindow, WindowConfig},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Window configuration for each operation kind.
#[derive(Debug, Clone)]
pub struct WindowTable {
    windows: HashMap<OperationKind, WindowConfig>,
    default_window: WindowConfig,
}

impl WindowTable {
    /// Table holding the three built-in limits, with the API limit as default.
    pub fn builtin() -> Self {
        let windows = HashMap::from([
            (OperationKind::Checkout, WindowConfig::checkout()),
            (OperationKind::Auth, WindowConfig::auth()),
            (OperationKind::Api, WindowConfig::api()),
        ]);
        Self {
            windows,
            default_window: WindowConfig::api(),
        }
    }

    /// Set the window for one operation kind.
    pub fn insert(&mut self, operation: OperationKind, config: WindowConfig) {
        self.windows.insert(operation, config);
    }

    /// Set the fallback used by operations with no explicit window.
    pub fn set_default(&mut self, config: WindowConfig) {
        self.default_window = config;
    }

    /// Window for an operation, falling back to the default.
    pub fn window_for(&self, operation: &OperationKind) -> WindowConfig {
        self.windows
            .get(operation)
            .copied()
            .unwrap_or(self.default_window)
    }

    /// Whether an operation has its own entry.
    pub fn is_configured(&self, operation: &OperationKind) -> bool {
        self.windows.contains_key(operation)
    }

    /// The fallback window.
    pub fn default_window(&self) -> WindowConfig {
        self.default_window
    }
}

impl Default for WindowTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Registry managing all rate-limit windows.
///
/// Uses the Storage port for concurrent access.
///
/// This type is generic over the storage implementation, allowing different
/// storage backends to be used. In production, use `Arc<ShardedStorage>`.
#[derive(Debug, Clone)]
pub struct WindowRegistry<S>
where
    S: Storage<RateLimitKey, SlidingWindow> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    table: Arc<WindowTable>,
}

impl<S> WindowRegistry<S>
where
    S: Storage<RateLimitKey, SlidingWindow> + Clone,
{
    /// Create a new registry with storage, clock, and window configuration.
    pub fn new(storage: S, clock: Arc<dyn Clock>, table: WindowTable) -> Self {
        Self {
            storage,
            clock,
            table: Arc::new(table),
        }
    }

    /// Access or create the window for a key with a callback.
    ///
    /// If this is the first time seeing this key, creates an empty window
    /// configured for the key's operation. The callback receives the window
    /// and the current instant.
    pub fn with_window<F, R>(&self, key: &RateLimitKey, f: F) -> R
    where
        F: FnOnce(&mut SlidingWindow, Instant) -> R,
    {
        let now = self.clock.now();
        let config = self.table.window_for(key.operation());
        self.storage.with_entry_mut(
            key.clone(),
            || SlidingWindow::new(config),
            |window| f(window, now),
        )
    }

    /// Access the window for a key only if it already exists.
    pub fn with_existing_window<F, R>(&self, key: &RateLimitKey, f: F) -> Option<R>
    where
        F: FnOnce(&mut SlidingWindow, Instant) -> R,
    {
        let now = self.clock.now();
        self.storage.with_existing_mut(key, |window| f(window, now))
    }

    /// Drop the window for a key. Returns true if one existed.
    pub fn remove(&self, key: &RateLimitKey) -> bool {
        self.storage.remove(key)
    }

    /// Remove windows for which the predicate returns false.
    pub fn cleanup<F>(&self, mut f: F)
    where
        F: FnMut(&RateLimitKey, &mut SlidingWindow, Instant) -> bool,
    {
        let now = self.clock.now();
        self.storage.retain(|key, window| f(key, window, now));
    }

    /// The window configuration table.
    pub fn table(&self) -> &WindowTable {
        &self.table
    }

    /// The registry's clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Get the number of tracked keys.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Clear all tracked state.
    pub fn clear(&self) {
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::storage::ShardedStorage;
    use std::time::Duration;

    fn registry() -> WindowRegistry<Arc<ShardedStorage<RateLimitKey, SlidingWindow>>> {
        WindowRegistry::new(
            Arc::new(ShardedStorage::new()),
            Arc::new(SystemClock::new()),
            WindowTable::builtin(),
        )
    }

    #[test]
    fn test_registry_creation() {
        let registry = registry();
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_window_created_with_operation_config() {
        let registry = registry();

        let max = registry.with_window(&RateLimitKey::auth("alice"), |window, _| {
            window.config().max_attempts()
        });
        assert_eq!(max, 5);

        let max = registry.with_window(&RateLimitKey::checkout("alice"), |window, _| {
            window.config().max_attempts()
        });
        assert_eq!(max, 3);

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unconfigured_operation_uses_default() {
        let mut table = WindowTable::builtin();
        let fallback = WindowConfig::new(7, Duration::from_secs(30)).unwrap();
        table.set_default(fallback);
        assert!(!table.is_configured(&OperationKind::custom("export")));
        assert_eq!(table.window_for(&OperationKind::custom("export")), fallback);
        assert_eq!(table.window_for(&OperationKind::Auth), WindowConfig::auth());
    }

    #[test]
    fn test_existing_window_access() {
        let registry = registry();
        let key = RateLimitKey::api("10.0.0.1");

        assert_eq!(registry.with_existing_window(&key, |w, _| w.len()), None);
        assert!(registry.is_empty());

        registry.with_window(&key, |w, now| w.register(now));
        assert_eq!(registry.with_existing_window(&key, |w, _| w.len()), Some(1));
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = registry();

        for i in 0..10 {
            let key = RateLimitKey::api(format!("caller-{}", i));
            registry.with_window(&key, |w, now| w.register(now));
        }
        assert_eq!(registry.len(), 10);

        assert!(registry.remove(&RateLimitKey::api("caller-3")));
        assert!(!registry.remove(&RateLimitKey::api("caller-3")));
        assert_eq!(registry.len(), 9);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let registry = Arc::new(registry());
        let mut handles = vec![];

        for i in 0..10 {
            let registry_clone = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let key = RateLimitKey::api(format!("caller_{}_{}", i, j));
                    registry_clone.with_window(&key, |w, now| w.register(now));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 1000);
    }
}

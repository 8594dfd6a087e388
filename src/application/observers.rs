//! Synchronous, ordered observer lists.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// A list of callbacks invoked in registration order.
///
/// `notify` snapshots the list and calls every callback outside the lock,
/// so callbacks may subscribe or unsubscribe without deadlocking. Changes
/// made during a notification take effect from the next one.
pub struct ObserverList<T> {
    observers: Mutex<Vec<(Subscription, Callback<T>)>>,
    next_id: AtomicU64,
}

impl<T> ObserverList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Subscription, Callback<T>)>> {
        // Callbacks never run under this lock
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a callback. It will be called after all earlier ones.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut observers = self.lock();
        let before = observers.len();
        observers.retain(|(id, _)| *id != subscription);
        observers.len() != before
    }

    /// Call every registered callback with `value`, in registration order.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self.lock().iter().map(|(_, cb)| Arc::clone(cb)).collect();
        for callback in snapshot {
            callback(value);
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.len())
            .finish()
    }
}

//! Cookie consent store.
//!
//! Reads and writes the user's consent record through a `KeyValueStore`,
//! and tells registered observers about every successful write.
//!
//! Reads never fail: missing, unreadable, corrupt and outdated records all
//! mean "ask the user again".

use crate::application::observers::{ObserverList, Subscription};
use crate::application::ports::{Clock, KeyValueStore, StorageError};
use crate::domain::consent::{
    Consent, ConsentCategory, ConsentChoices, ConsentRecord, CONSENT_VERSION,
};
use serde::Deserialize;
use std::sync::Arc;

/// Where and under which version consent is stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    /// Storage key holding the serialized record
    pub storage_key: String,
    /// Version stamped on new records; any other version is stale
    pub version: String,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            storage_key: "cookie-consent".to_string(),
            version: CONSENT_VERSION.to_string(),
        }
    }
}

/// Versioned consent persistence with change notification.
///
/// # Example
/// ```
/// use client_governance::{ConsentChoices, ConsentConfig, ConsentStore, MemoryKeyValueStore, SystemClock};
/// use std::sync::Arc;
///
/// let store = ConsentStore::new(
///     MemoryKeyValueStore::new(),
///     Arc::new(SystemClock::new()),
///     ConsentConfig::default(),
/// );
/// assert!(store.needs_consent());
///
/// store.save_consent(ConsentChoices::new(true, false, false)).unwrap();
/// let record = store.get_stored_consent().unwrap();
/// assert!(record.functional);
/// assert!(!store.needs_consent());
/// ```
#[derive(Debug)]
pub struct ConsentStore<K: KeyValueStore> {
    store: K,
    clock: Arc<dyn Clock>,
    config: ConsentConfig,
    observers: ObserverList<ConsentRecord>,
}

impl<K: KeyValueStore> ConsentStore<K> {
    /// Create a store over a key-value backend.
    pub fn new(store: K, clock: Arc<dyn Clock>, config: ConsentConfig) -> Self {
        Self {
            store,
            clock,
            config,
            observers: ObserverList::new(),
        }
    }

    /// Load and classify whatever is stored.
    pub fn load(&self) -> Consent {
        let raw = match self.store.get(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Consent::Absent,
            Err(e) => {
                tracing::warn!(key = %self.config.storage_key, error = %e, "failed to read stored consent");
                return Consent::Absent;
            }
        };

        match serde_json::from_str::<ConsentRecord>(&raw) {
            Ok(record) => {
                let consent = Consent::classify(record, &self.config.version);
                if let Consent::StaleVersion(ref stale) = consent {
                    tracing::debug!(
                        stored = %stale.version,
                        expected = %self.config.version,
                        "stored consent has an outdated version"
                    );
                }
                consent
            }
            Err(e) => {
                tracing::warn!(key = %self.config.storage_key, error = %e, "stored consent is corrupt");
                Consent::Absent
            }
        }
    }

    /// The stored record, if present and written under the current version.
    pub fn get_stored_consent(&self) -> Option<ConsentRecord> {
        self.load().valid()
    }

    /// Whether the user has to be asked for consent.
    pub fn needs_consent(&self) -> bool {
        self.get_stored_consent().is_none()
    }

    /// Stamp, persist and broadcast a consent decision.
    ///
    /// `necessary` is always stored as true. Observers run synchronously, in
    /// registration order, before this returns; they are not called if the
    /// write fails.
    ///
    /// # Errors
    /// Returns the storage error if the record could not be persisted.
    pub fn save_consent(&self, choices: ConsentChoices) -> Result<ConsentRecord, StorageError> {
        if !choices.necessary {
            tracing::debug!("necessary cookies cannot be declined; storing necessary=true");
        }

        let record = ConsentRecord::stamp(choices, self.clock.utc_now(), self.config.version.as_str());
        let serialized = serde_json::to_string(&record)?;

        if let Err(e) = self.store.set(&self.config.storage_key, &serialized) {
            tracing::warn!(key = %self.config.storage_key, error = %e, "failed to persist consent");
            return Err(e);
        }

        tracing::debug!(
            functional = record.functional,
            analytics = record.analytics,
            marketing = record.marketing,
            version = %record.version,
            "consent saved"
        );
        self.observers.notify(&record);
        Ok(record)
    }

    /// Grant every category.
    pub fn accept_all(&self) -> Result<ConsentRecord, StorageError> {
        self.save_consent(ConsentChoices::all())
    }

    /// Keep only necessary cookies.
    pub fn reject_all(&self) -> Result<ConsentRecord, StorageError> {
        self.save_consent(ConsentChoices::necessary_only())
    }

    /// Remove the stored record. Observers are not notified.
    pub fn clear_consent(&self) -> Result<(), StorageError> {
        self.store.remove(&self.config.storage_key)
    }

    /// Whether a category may be used right now.
    ///
    /// Necessary cookies are always allowed; everything else needs a valid
    /// record that grants it.
    pub fn is_granted(&self, category: ConsentCategory) -> bool {
        match category {
            ConsentCategory::Necessary => true,
            other => self
                .get_stored_consent()
                .is_some_and(|record| record.allows(other)),
        }
    }

    /// Call `observer` with every record saved from now on.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ConsentRecord) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Stop notifying an observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    /// The active configuration.
    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    /// The underlying key-value store.
    pub fn store(&self) -> &K {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::kv::MemoryKeyValueStore;
    use crate::infrastructure::mocks::MockClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn store() -> ConsentStore<MemoryKeyValueStore> {
        ConsentStore::new(
            MemoryKeyValueStore::new(),
            Arc::new(MockClock::default()),
            ConsentConfig::default(),
        )
    }

    #[derive(Debug)]
    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    #[test]
    fn test_absent_until_saved() {
        let store = store();
        assert_eq!(store.load(), Consent::Absent);
        assert!(store.needs_consent());
    }

    #[test]
    fn test_save_stamps_time_and_version() {
        let store = store();
        let record = store.save_consent(ConsentChoices::new(true, false, false)).unwrap();

        assert_eq!(record.version, CONSENT_VERSION);
        assert_eq!(record.timestamp.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(store.get_stored_consent(), Some(record));
    }

    #[test]
    fn test_necessary_cannot_be_declined() {
        let store = store();
        let mut choices = ConsentChoices::necessary_only();
        choices.necessary = false;

        let record = store.save_consent(choices).unwrap();
        assert!(record.necessary);
        assert!(store.is_granted(ConsentCategory::Necessary));
    }

    #[test]
    fn test_accept_and_reject_all() {
        let store = store();

        let accepted = store.accept_all().unwrap();
        assert!(accepted.necessary && accepted.functional && accepted.analytics && accepted.marketing);

        let rejected = store.reject_all().unwrap();
        assert!(rejected.necessary);
        assert!(!rejected.functional && !rejected.analytics && !rejected.marketing);
        assert_eq!(store.get_stored_consent(), Some(rejected));
    }

    #[test]
    fn test_corrupt_record_is_absent() {
        let store = store();
        store.store().set("cookie-consent", "{not json").unwrap();
        assert_eq!(store.load(), Consent::Absent);

        store
            .store()
            .set("cookie-consent", r#"{"necessary":true,"timestamp":"yesterday","version":"1.0"}"#)
            .unwrap();
        assert_eq!(store.load(), Consent::Absent);
    }

    #[test]
    fn test_stale_version_is_reported() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let clock = Arc::new(MockClock::default());

        let old = ConsentStore::new(
            Arc::clone(&kv),
            clock.clone(),
            ConsentConfig {
                version: "0.9".to_string(),
                ..ConsentConfig::default()
            },
        );
        let written = old.accept_all().unwrap();

        let current = ConsentStore::new(kv, clock, ConsentConfig::default());
        assert_eq!(current.load(), Consent::StaleVersion(written));
        assert_eq!(current.get_stored_consent(), None);
        assert!(current.needs_consent());
    }

    #[test]
    fn test_clear_consent() {
        let store = store();
        store.accept_all().unwrap();
        store.clear_consent().unwrap();
        assert!(store.needs_consent());
        // Clearing twice is fine
        store.clear_consent().unwrap();
    }

    #[test]
    fn test_is_granted() {
        let store = store();
        assert!(!store.is_granted(ConsentCategory::Analytics));

        store.save_consent(ConsentChoices::new(false, true, false)).unwrap();
        assert!(store.is_granted(ConsentCategory::Analytics));
        assert!(!store.is_granted(ConsentCategory::Marketing));
        assert!(!store.is_granted(ConsentCategory::Functional));
    }

    #[test]
    fn test_observer_sees_saved_record_before_return() {
        let store = Arc::new(store());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let store_clone = Arc::clone(&store);
        let seen_clone = Arc::clone(&seen);
        store.subscribe(move |record| {
            // Storage already holds the new value when observers run
            let stored = store_clone.get_stored_consent();
            seen_clone.lock().unwrap().push((record.clone(), stored));
        });

        let saved = store.save_consent(ConsentChoices::new(true, true, false)).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, saved);
        assert_eq!(seen[0].1.as_ref(), Some(&saved));
    }

    #[test]
    fn test_unsubscribed_observer_not_called() {
        let store = store();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = Arc::clone(&calls);
        let sub = store.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.accept_all().unwrap();
        assert!(store.unsubscribe(sub));
        store.reject_all().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_storage_failures() {
        let store = ConsentStore::new(
            FailingStore,
            Arc::new(MockClock::default()),
            ConsentConfig::default(),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        store.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Reads fail open to "no consent"
        assert_eq!(store.load(), Consent::Absent);
        assert!(store.needs_consent());

        // Writes surface the error and do not notify
        assert!(matches!(store.accept_all(), Err(StorageError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

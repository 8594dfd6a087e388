use chrono::{TimeZone, Utc};
use client_governance::mocks::MockClock;
use client_governance::{
    Consent, ConsentCategory, ConsentChoices, ConsentConfig, ConsentRecord, ConsentStore,
    FileKeyValueStore, KeyValueStore,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn clock() -> Arc<MockClock> {
    Arc::new(MockClock::with_wall_clock(
        Instant::now(),
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
    ))
}

#[test]
fn test_consent_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local-storage.json");

    let saved = {
        let store = ConsentStore::new(FileKeyValueStore::open(&path), clock(), ConsentConfig::default());
        assert!(store.needs_consent());
        store.save_consent(ConsentChoices::new(true, false, true)).unwrap()
    };

    let reopened = ConsentStore::new(FileKeyValueStore::open(&path), clock(), ConsentConfig::default());
    assert_eq!(reopened.get_stored_consent(), Some(saved));
    assert!(reopened.is_granted(ConsentCategory::Functional));
    assert!(!reopened.is_granted(ConsentCategory::Analytics));
    assert!(reopened.is_granted(ConsentCategory::Marketing));
}

#[test]
fn test_stored_format() {
    let dir = tempfile::tempdir().unwrap();
    let kv = Arc::new(FileKeyValueStore::open(dir.path().join("ls.json")));
    let store = ConsentStore::new(Arc::clone(&kv), clock(), ConsentConfig::default());

    store.accept_all().unwrap();

    let raw = kv.get("cookie-consent").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["necessary"], true);
    assert_eq!(value["marketing"], true);
    assert_eq!(value["version"], "1.0");
    assert_eq!(value["timestamp"], "2025-03-14T09:30:00Z");
}

#[test]
fn test_record_written_by_other_client_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let kv = Arc::new(FileKeyValueStore::open(dir.path().join("ls.json")));
    kv.set(
        "cookie-consent",
        r#"{"necessary":true,"functional":false,"analytics":true,"marketing":false,"timestamp":"2024-06-01T12:00:00.000Z","version":"1.0"}"#,
    )
    .unwrap();

    let store = ConsentStore::new(kv, clock(), ConsentConfig::default());
    let record = store.get_stored_consent().unwrap();
    assert!(record.analytics);
    assert_eq!(record.timestamp, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
}

#[test]
fn test_version_bump_requires_new_consent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ls.json");

    let v1 = ConsentStore::new(FileKeyValueStore::open(&path), clock(), ConsentConfig::default());
    v1.accept_all().unwrap();
    assert!(!v1.needs_consent());

    let v2_config = ConsentConfig {
        version: "2.0".to_string(),
        ..ConsentConfig::default()
    };
    let v2 = ConsentStore::new(FileKeyValueStore::open(&path), clock(), v2_config);
    assert!(matches!(v2.load(), Consent::StaleVersion(ref r) if r.version == "1.0"));
    assert!(v2.needs_consent());
    assert!(!v2.is_granted(ConsentCategory::Analytics));

    let renewed = v2.reject_all().unwrap();
    assert_eq!(renewed.version, "2.0");
    assert!(!v2.needs_consent());
}

#[test]
fn test_observers_notified_in_order_with_each_save() {
    let clock = clock();
    let store = ConsentStore::new(
        client_governance::MemoryKeyValueStore::new(),
        clock.clone(),
        ConsentConfig::default(),
    );
    let log: Arc<Mutex<Vec<(&'static str, ConsentRecord)>>> = Arc::new(Mutex::new(Vec::new()));

    for name in ["banner", "analytics-loader"] {
        let log = Arc::clone(&log);
        store.subscribe(move |record| log.lock().unwrap().push((name, record.clone())));
    }

    let first = store.accept_all().unwrap();
    clock.advance(Duration::from_secs(3600));
    let second = store.save_consent(ConsentChoices::new(false, true, false)).unwrap();
    assert!(second.timestamp > first.timestamp);

    let log = log.lock().unwrap();
    let order: Vec<_> = log.iter().map(|(name, _)| *name).collect();
    assert_eq!(order, vec!["banner", "analytics-loader", "banner", "analytics-loader"]);
    assert_eq!(log[0].1, first);
    assert_eq!(log[3].1, second);
}

#[test]
fn test_clear_then_prompt_again() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConsentStore::new(
        FileKeyValueStore::open(dir.path().join("ls.json")),
        clock(),
        ConsentConfig::default(),
    );

    store.accept_all().unwrap();
    store.clear_consent().unwrap();
    assert_eq!(store.load(), Consent::Absent);
}

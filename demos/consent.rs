//! Cookie consent persisted to a JSON file.
//!
//! Run twice: the second run finds the stored decision and skips the prompt.

use client_governance::{
    ConsentCategory, ConsentChoices, ConsentConfig, ConsentStore, FileKeyValueStore, SystemClock,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("client-governance-consent.json");
    let store = ConsentStore::new(
        FileKeyValueStore::open(&path),
        Arc::new(SystemClock::new()),
        ConsentConfig::default(),
    );

    store.subscribe(|record| {
        if record.analytics {
            println!("-> loading analytics scripts");
        } else {
            println!("-> analytics stays off");
        }
    });

    if store.needs_consent() {
        println!("No valid consent stored in {}; showing banner", path.display());
        // The user keeps functional cookies and declines the rest
        store.save_consent(ConsentChoices::new(true, false, false))?;
    } else {
        println!("Consent already stored in {}", path.display());
    }

    for category in ConsentCategory::ALL {
        println!("{:<11} granted: {}", category.as_str(), store.is_granted(category));
    }
    Ok(())
}

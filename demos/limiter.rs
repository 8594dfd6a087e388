//! Rate limiting a checkout endpoint.
//!
//! Run with `RUST_LOG=client_governance=debug cargo run --example limiter`
//! to see the limiter's own decision logs.

use client_governance::{
    GovernanceConfig, OperationKind, RateLimitDecision, RateLimitKey, RateLimiterBuilder,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = GovernanceConfig::from_json_str(
        r#"{
            "limits": {
                "operations": {
                    "export": { "max_attempts": 2, "window_ms": 10000 }
                }
            }
        }"#,
    )?;
    let limiter = RateLimiterBuilder::from_config(&config.limits).build()?;

    println!("=== Checkout (3 per minute) ===");
    let checkout = RateLimitKey::checkout("user-42");
    for attempt in 1..=5 {
        match limiter.check(&checkout) {
            RateLimitDecision::Allowed => println!("attempt {}: allowed", attempt),
            RateLimitDecision::Limited { retry_after_secs } => {
                println!("attempt {}: limited, retry in {}s", attempt, retry_after_secs)
            }
        }
    }

    println!("\n=== Successful checkout resets the caller ===");
    limiter.reset(&checkout);
    println!("remaining after reset: {}", limiter.remaining(&checkout));

    println!("\n=== Custom operation from config (2 per 10s) ===");
    let export = RateLimitKey::new(OperationKind::from_name("export"), "tenant-7");
    for attempt in 1..=3 {
        let decision = limiter.check(&export);
        println!("export {}: {:?}", attempt, decision);
    }

    let snapshot = limiter.metrics().snapshot();
    println!(
        "\nchecks: {} allowed, {} limited ({:.0}% limited)",
        snapshot.checks_allowed,
        snapshot.checks_limited,
        snapshot.limit_rate() * 100.0
    );
    Ok(())
}

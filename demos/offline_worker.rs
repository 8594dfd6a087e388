//! Offline cache worker against a scripted network.
//!
//! Installs, activates, then goes offline and shows each fallback path.

use client_governance::mocks::{MockClientWindows, MockFetcher};
use client_governance::{
    MemoryCacheStorage, OfflineWorker, PushHandler, Request, Response, TracingNotificationSink,
    WorkerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let fetcher = Arc::new(MockFetcher::serving_ok());
    fetcher.respond("/offline.html", Response::ok("<h1>Offline</h1>"));
    fetcher.respond("/api/runs", Response::ok(r#"[{"id":1,"status":"done"}]"#));

    let worker = OfflineWorker::new(
        WorkerConfig::default().with_network_timeout(Duration::from_secs(5)),
        fetcher.clone(),
        Arc::new(MemoryCacheStorage::new()),
    )?;
    worker.install().await?;
    worker.activate().await?;

    let runs = worker.handle_fetch(&Request::get("/api/runs")).await?;
    println!("online  /api/runs      -> {} {:?}", runs.status, runs.body);

    fetcher.go_offline();
    for request in [
        Request::get("/api/runs"),
        Request::navigate("/settings"),
        Request::get("/images/logo.png"),
    ] {
        let response = worker.handle_fetch(&request).await?;
        println!("offline {:<16} -> {} {:?}", request.url, response.status, response.body);
    }

    let push = PushHandler::new(
        Arc::new(TracingNotificationSink::new()),
        Arc::new(MockClientWindows::new()),
    );
    let notification = push
        .handle_push(Some(&br#"{"title":"Run finished","url":"/runs/1"}"#[..]))
        .await;
    push.handle_notification_click(&notification, Some("view")).await;
    Ok(())
}

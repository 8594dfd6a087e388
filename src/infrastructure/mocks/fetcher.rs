//! Scriptable fetcher for testing the cache worker.

use crate::application::ports::{FetchError, Fetcher};
use crate::domain::fetch::{Request, Response};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Fetcher with canned responses and a switchable network.
///
/// URLs without a scripted response get a 200 whose body is the URL itself,
/// which keeps precache tests short.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<Request>>,
}

impl MockFetcher {
    /// A fetcher that answers every URL with a 200.
    pub fn serving_ok() -> Self {
        Self::default()
    }

    /// Script the response for `url`.
    pub fn respond(&self, url: &str, response: Response) {
        self.responses
            .lock()
            .expect("MockFetcher mutex poisoned")
            .insert(url.to_string(), response);
    }

    /// Make every subsequent fetch fail with a network error.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    /// Delay every response by `delay` (uses tokio time, so it can be paused).
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("MockFetcher mutex poisoned") = Some(delay);
    }

    /// Every request seen so far, including ones that failed.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("MockFetcher mutex poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("MockFetcher mutex poisoned").len()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.requests
            .lock()
            .expect("MockFetcher mutex poisoned")
            .push(request.clone());

        let delay = *self.delay.lock().expect("MockFetcher mutex poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network("network unreachable".to_string()));
        }

        let scripted = self
            .responses
            .lock()
            .expect("MockFetcher mutex poisoned")
            .get(&request.url)
            .cloned();
        Ok(scripted.unwrap_or_else(|| Response::ok(request.url.clone())))
    }
}

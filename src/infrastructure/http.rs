//! `Fetcher` backed by reqwest.

use crate::application::ports::{FetchError, Fetcher};
use crate::domain::fetch::{Method, Request, Response};
use async_trait::async_trait;

/// Fetches absolute URLs, or paths resolved against a base URL.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ReqwestFetcher {
    /// Wrap an existing client; URLs are used as given.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    /// Resolve relative request URLs (like `/offline.html`) against `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => format!("{}{}", base, url),
            _ => url.to_string(),
        }
    }
}

fn to_reqwest_method(method: &Method) -> Result<reqwest::Method, FetchError> {
    reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| FetchError::Network(format!("invalid method {}: {}", method, e)))
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = self.resolve(&request.url);
        let mut builder = self
            .client
            .request(to_reqwest_method(&request.method)?, url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        tracing::trace!(url = %url, status = status.as_u16(), "fetched");
        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_urls() {
        let fetcher = ReqwestFetcher::new(reqwest::Client::new()).with_base_url("https://app.example/");
        assert_eq!(fetcher.resolve("/offline.html"), "https://app.example/offline.html");
        assert_eq!(fetcher.resolve("https://cdn.example/a.js"), "https://cdn.example/a.js");

        let bare = ReqwestFetcher::new(reqwest::Client::new());
        assert_eq!(bare.resolve("/x"), "/x");
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(&Method::Get).unwrap(), reqwest::Method::GET);
        assert_eq!(
            to_reqwest_method(&Method::Other("PURGE".to_string())).unwrap().as_str(),
            "PURGE"
        );
    }
}

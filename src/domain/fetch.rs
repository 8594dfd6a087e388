//! Request and response types seen by the offline cache worker.

use bytes::Bytes;
use std::fmt;

/// HTTP request method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Other(String),
}

impl Method {
    /// Parse a method name, case-insensitively.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Other(name) => name,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    /// Subresource or script-initiated request
    #[default]
    Subresource,
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Absolute URL or path relative to the origin
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Whether this is a page navigation
    pub mode: RequestMode,
    /// Header name/value pairs in send order
    pub headers: Vec<(String, String)>,
    /// Request body, if any
    pub body: Option<Bytes>,
}

impl Request {
    /// A subresource GET.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            mode: RequestMode::Subresource,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A page navigation (always GET).
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            mode: RequestMode::Navigate,
            ..Self::get(url)
        }
    }

    /// A request with an arbitrary method and optional body.
    pub fn new(method: Method, url: impl Into<String>, body: Option<Bytes>) -> Self {
        Self {
            method,
            body,
            ..Self::get(url)
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Check if this is a page navigation.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Cache identity, if this request may be cached at all.
    pub fn cache_key(&self) -> Option<CacheKey> {
        (self.method == Method::Get).then(|| CacheKey::get(self.url.clone()))
    }
}

/// Identity of a cached entry.
///
/// Only GET requests are ever cached; the method is kept in the key so a
/// cache never mistakes another method's entry for a GET.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: Method,
    url: String,
}

impl CacheKey {
    /// Key for a GET of `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
        }
    }

    /// Method part of the key.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL part of the key.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response. Bodies are `Bytes`, so cloning one for the cache is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    /// A response with the given status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// A 200 response.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status_text: "OK".to_string(),
            ..Self::new(200, body)
        }
    }

    /// The synthesized response returned when both network and cache miss.
    pub fn offline() -> Self {
        Self {
            status: 503,
            status_text: "Service Unavailable".to_string(),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: Bytes::from_static(b"Offline"),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Only plain 200 responses are worth caching.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }
}

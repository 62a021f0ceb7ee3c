//! HTTP transport capability.
//!
//! The core issues requests through the narrow [`Transport`] trait and
//! never touches an HTTP client directly, so embeddings can inject
//! their own plumbing (or a recording fake). [`HttpTransport`] is the
//! reqwest-backed default.

pub mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::time::Duration;

/// One outgoing HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method (POST for chat/generation, GET for model listing).
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// JSON body, when the method carries one.
    pub body: Option<Value>,
    /// Per-request timeout override; the transport's own default
    /// applies when unset.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Raw result of an HTTP exchange: status plus unparsed body bytes.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body parsed as JSON, or `None` when it is not valid JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Other(String),
}

/// The injectable transport capability. Implementations decide their
/// own pooling and connection reuse; the core only consumes `send`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let ok = TransportResponse {
            status: 204,
            body: Bytes::new(),
        };
        assert!(ok.is_success());
        let not = TransportResponse {
            status: 404,
            body: Bytes::new(),
        };
        assert!(!not.is_success());
    }

    #[test]
    fn test_json_parses_or_degrades() {
        let resp = TransportResponse {
            status: 200,
            body: Bytes::from_static(b"{\"ok\":true}"),
        };
        assert_eq!(resp.json().unwrap()["ok"], true);

        let resp = TransportResponse {
            status: 200,
            body: Bytes::from_static(b"not json"),
        };
        assert!(resp.json().is_none());
    }
}

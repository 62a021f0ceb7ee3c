use serde_json::Value;
use thiserror::Error;

/// Unified error type for the library.
///
/// Aggregates the two failure classes (caller misconfiguration vs.
/// provider interaction) plus transport bootstrap failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("provider request error: {0}")]
    Request(#[from] RequestError),

    #[error("transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),
}

/// Raised at resolution or construction time, never mid-call.
///
/// A `ConfigError` means the caller's configuration must be fixed before
/// retrying: an unknown provider name, a driver string matching no
/// factory, or a missing credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("LLM provider [{0}] is not configured")]
    MissingProvider(String),

    #[error("unsupported LLM driver [{0}]")]
    UnsupportedDriver(String),

    #[error("API key is not configured for provider [{0}]")]
    MissingApiKey(String),

    #[error("provider [{provider}] does not support {capability}")]
    UnsupportedCapability {
        provider: String,
        capability: &'static str,
    },

    #[error("invalid LLM configuration: {0}")]
    Invalid(String),
}

/// Raised when a vendor call fails: a non-2xx HTTP status, a wrapped
/// transport-level failure, or a vendor soft-failure envelope reported
/// inside a 2xx response.
///
/// Carries the HTTP status when one was observed and the raw response
/// body when one was readable, so callers can inspect the vendor's own
/// error shape.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<Value>,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Build an error from a failed HTTP exchange, preferring the
    /// vendor's own `error.message` field over the generic context.
    pub fn from_response(context: &str, status: u16, body: Option<Value>) -> Self {
        let vendor_message = body
            .as_ref()
            .and_then(|b| b.pointer("/error/message"))
            .and_then(|m| m.as_str());

        let message = match vendor_message {
            Some(m) => format!("{context}: {m}"),
            None => format!("{context} (HTTP {status})"),
        };

        Self {
            message,
            status: Some(status),
            body,
        }
    }

    /// Wrap a transport-level failure with call-site context.
    pub fn transport(context: &str, source: impl std::fmt::Display) -> Self {
        Self::new(format!("{context}: {source}"))
    }
}

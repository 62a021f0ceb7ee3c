//! Provider 驱动层 — 能力契约与按名分发的适配器实现
//!
//! Provider adapter layer. Each vendor gets one adapter implementing
//! the capability traits it actually supports; [`build_driver`] maps a
//! driver string to the matching built-in. Capabilities are checked at
//! runtime, not by the type system, since drivers are chosen by name
//! from configuration; the manager is the enforcement point.

pub mod anthropic;
pub mod dummy;
pub mod modelslab;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use dummy::DummyClient;
pub use modelslab::ModelsLabClient;
pub use openai::OpenAiClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::ConfigError;
use crate::transport::Transport;
use crate::types::{ChatOptions, ChatResponse, ImageParams, ImageResponse};
use crate::Result;

/// Base capability every adapter satisfies.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Best-effort liveness probe. Never errors: every failure mode
    /// (network, non-2xx, parse) degrades to `false`.
    async fn is_available(&self) -> bool;

    /// The models this provider offers. Network-backed where the vendor
    /// has a listing endpoint; a fixed snapshot otherwise.
    async fn available_models(&self) -> Result<Vec<String>>;

    /// Runtime capability accessor; adapters that support chat return
    /// themselves.
    fn chat_capability(self: Arc<Self>) -> Option<Arc<dyn ChatCapable>> {
        None
    }

    /// Runtime capability accessor; adapters that support image
    /// generation return themselves.
    fn image_capability(self: Arc<Self>) -> Option<Arc<dyn ImageCapable>> {
        None
    }
}

/// Chat completion capability.
#[async_trait]
pub trait ChatCapable: LlmClient {
    async fn chat(&self, prompt: &str, options: ChatOptions) -> Result<ChatResponse>;
}

/// Image generation capability.
#[async_trait]
pub trait ImageCapable: LlmClient {
    async fn generate(&self, params: ImageParams) -> Result<ImageResponse>;
}

/// Build the built-in adapter matching the config's driver string.
///
/// Custom factories registered on the manager take precedence and never
/// reach this function.
pub(crate) fn build_driver(
    provider: &str,
    config: &ProviderConfig,
    transport: Arc<dyn Transport>,
) -> Result<Arc<dyn LlmClient>> {
    match config.driver.as_str() {
        "openai" => Ok(Arc::new(OpenAiClient::new(provider, config.clone(), transport)?)),
        "anthropic" => Ok(Arc::new(AnthropicClient::new(
            provider,
            config.clone(),
            transport,
        )?)),
        "modelslab" => Ok(Arc::new(ModelsLabClient::new(
            provider,
            config.clone(),
            transport,
        )?)),
        "dummy" => Ok(Arc::new(DummyClient::from_config(config))),
        other => Err(ConfigError::UnsupportedDriver(other.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpTransport;

    fn transport() -> Arc<dyn Transport> {
        Arc::new(HttpTransport::new().expect("transport"))
    }

    #[test]
    fn test_unknown_driver_is_a_config_error() {
        let config = ProviderConfig::new("smoke-signals");
        let err = build_driver("test", &config, transport()).err().unwrap();
        assert!(err.to_string().contains("[smoke-signals]"));
    }

    #[test]
    fn test_vendor_adapters_require_an_api_key() {
        for driver in ["openai", "anthropic", "modelslab"] {
            let config = ProviderConfig::new(driver);
            assert!(build_driver("test", &config, transport()).is_err());
        }
    }

    #[test]
    fn test_dummy_builds_without_credentials() {
        let config = ProviderConfig::new("dummy");
        let client = build_driver("test", &config, transport()).unwrap();
        assert!(client.chat_capability().is_some());
    }
}

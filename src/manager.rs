//! Provider 解析与实例缓存 — 把 provider 名称映射到具体的客户端实例
//!
//! The entry point: resolves a provider name to a cached adapter
//! instance, supports runtime registration of custom drivers, and
//! offers convenience pass-throughs for the common calls.
//!
//! The instance cache is plain mutable state scoped to one manager.
//! Sharing a manager across concurrent callers requires the embedding
//! application to serialize access; the core deliberately ships no
//! internal locking, since most embeddings resolve once per invocation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::{LlmConfig, ProviderConfig};
use crate::drivers::{build_driver, ChatCapable, ImageCapable, LlmClient};
use crate::error::ConfigError;
use crate::transport::{HttpTransport, Transport};
use crate::types::ChatOptions;
use crate::Result;

/// A registered driver factory: builds a client from a provider
/// section. Registered via [`LlmManager::extend`] and consulted before
/// the built-in drivers.
pub type DriverFactory = Box<dyn Fn(&ProviderConfig) -> Result<Arc<dyn LlmClient>> + Send + Sync>;

/// Resolves provider names to live adapter instances.
///
/// One manager per application context; thread it to call sites rather
/// than holding it in a global.
pub struct LlmManager {
    config: LlmConfig,
    transport: Arc<dyn Transport>,
    clients: HashMap<String, Arc<dyn LlmClient>>,
    custom_drivers: HashMap<String, DriverFactory>,
    current: Option<String>,
}

impl LlmManager {
    /// Build a manager with the default reqwest-backed transport.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a manager around an injected transport (tests, custom
    /// plumbing).
    pub fn with_transport(config: LlmConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            clients: HashMap::new(),
            custom_drivers: HashMap::new(),
            current: None,
        }
    }

    /// Resolve a provider name to its client instance.
    ///
    /// With `None` the configured default provider is used. Two calls
    /// with the same name return the identical instance (`Arc::ptr_eq`)
    /// until [`forget_client`](Self::forget_client) evicts it.
    pub fn client(&mut self, name: Option<&str>) -> Result<Arc<dyn LlmClient>> {
        let name = name
            .unwrap_or_else(|| self.config.default_provider())
            .to_string();

        if let Some(client) = self.clients.get(&name) {
            debug!(provider = %name, "resolved client from cache");
            return Ok(Arc::clone(client));
        }

        let config = self
            .config
            .provider(&name)
            .ok_or_else(|| ConfigError::MissingProvider(name.clone()))?
            .clone();

        let client = match self.custom_drivers.get(&config.driver) {
            Some(factory) => factory(&config)?,
            None => build_driver(&name, &config, Arc::clone(&self.transport))?,
        };

        debug!(provider = %name, driver = %config.driver, "built new client");
        self.clients.insert(name, Arc::clone(&client));
        Ok(client)
    }

    /// Register (or override) a driver factory. Takes precedence over
    /// the built-in driver of the same name on subsequent resolutions;
    /// already-cached instances are not invalidated.
    pub fn extend(
        &mut self,
        driver: impl Into<String>,
        factory: impl Fn(&ProviderConfig) -> Result<Arc<dyn LlmClient>> + Send + Sync + 'static,
    ) {
        self.custom_drivers.insert(driver.into(), Box::new(factory));
    }

    /// Evict a cached instance; the next resolution rebuilds it.
    pub fn forget_client(&mut self, name: &str) {
        self.clients.remove(name);
    }

    /// Point the convenience methods at a provider. Chainable.
    pub fn using(&mut self, name: impl Into<String>) -> &mut Self {
        self.current = Some(name.into());
        self
    }

    /// Send a chat prompt through the current (or default) provider and
    /// return just the text.
    pub async fn chat(&mut self, prompt: &str, options: ChatOptions) -> Result<String> {
        let name = self.current_provider_name();
        let client = self.client(Some(&name))?;

        let chat = client
            .chat_capability()
            .ok_or_else(|| ConfigError::UnsupportedCapability {
                provider: name,
                capability: "chat",
            })?;

        let response = chat.chat(prompt, options).await?;
        Ok(response.content)
    }

    /// Resolve the current (or default) provider as an image-capable
    /// adapter, for richer calls than the chat shortcut.
    pub fn image(&mut self) -> Result<Arc<dyn ImageCapable>> {
        let name = self.current_provider_name();
        let client = self.client(Some(&name))?;

        client
            .image_capability()
            .ok_or_else(|| {
                ConfigError::UnsupportedCapability {
                    provider: name,
                    capability: "image generation",
                }
                .into()
            })
    }

    pub fn default_provider(&self) -> &str {
        self.config.default_provider()
    }

    /// All configured provider names, in declaration order.
    pub fn providers(&self) -> Vec<&str> {
        self.config.provider_names()
    }

    fn current_provider_name(&self) -> String {
        self.current
            .clone()
            .unwrap_or_else(|| self.config.default_provider().to_string())
    }
}

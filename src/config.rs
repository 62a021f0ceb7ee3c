//! Static configuration consumed once at manager construction.
//!
//! The host application owns the loading mechanism; this module only
//! defines the shapes plus thin YAML helpers for hosts that keep their
//! provider map in a file.

use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Settings for one named provider. Immutable once a client has been
/// built from it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderConfig {
    /// Selects the adapter implementation (`openai`, `anthropic`,
    /// `modelslab`, `dummy`, or a driver registered via `extend`).
    pub driver: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub image_model: Option<String>,
    /// Per-request timeout forwarded to the transport.
    pub timeout_secs: Option<u64>,
    /// Dummy driver: seed for the canned chat response.
    pub chat_response: Option<String>,
    /// Dummy driver: seed for the canned image URL.
    pub image_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..Default::default()
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn chat_model(mut self, chat_model: impl Into<String>) -> Self {
        self.chat_model = Some(chat_model.into());
        self
    }

    pub fn image_model(mut self, image_model: impl Into<String>) -> Self {
        self.image_model = Some(image_model.into());
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn chat_response(mut self, chat_response: impl Into<String>) -> Self {
        self.chat_response = Some(chat_response.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// The API key, or `ConfigError::MissingApiKey` when absent or
    /// empty. Vendor-backed adapters call this once, at build time.
    pub fn require_api_key(&self, provider: &str) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey(provider.to_string())),
        }
    }
}

/// The full provider map: a default provider name plus named provider
/// sections in declaration order.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    default: String,
    #[serde(deserialize_with = "ordered_providers", default)]
    providers: Vec<(String, ProviderConfig)>,
}

impl LlmConfig {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            providers: Vec::new(),
        }
    }

    /// Add (or replace) a provider section. Declaration order is kept.
    pub fn with_provider(mut self, name: impl Into<String>, config: ProviderConfig) -> Self {
        let name = name.into();
        match self.providers.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = config,
            None => self.providers.push((name, config)),
        }
        self
    }

    pub fn default_provider(&self) -> &str {
        &self.default
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// All configured provider names, in declaration order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Invalid(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_yaml_str(&contents)
    }
}

/// Deserialize the provider map into a `Vec` so YAML/JSON declaration
/// order survives (`provider_names` promises it).
fn ordered_providers<'de, D>(deserializer: D) -> Result<Vec<(String, ProviderConfig)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, ProviderConfig)>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a map of provider name to provider settings")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut providers = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, ProviderConfig>()? {
                providers.push(entry);
            }
            Ok(providers)
        }
    }

    deserializer.deserialize_map(OrderedVisitor)
}

//! Test adapter: canned responses, no network I/O.
//!
//! The only adapter with observable state beyond its configuration:
//! every call is recorded into an append-only history so tests can
//! assert on exactly what was sent.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{ChatCapable, ImageCapable, LlmClient};
use crate::config::ProviderConfig;
use crate::types::{ChatOptions, ChatResponse, ImageParams, ImageResponse};
use crate::Result;

const DEFAULT_IMAGE_URL: &str = "https://example.com/dummy-image.png";

/// One recorded chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCall {
    pub prompt: String,
    pub options: ChatOptions,
}

/// In-memory adapter for tests. Implements both capabilities.
#[derive(Debug, Default)]
pub struct DummyClient {
    chat_response: Mutex<Option<String>>,
    image_url: Mutex<Option<String>>,
    chat_history: Mutex<Vec<ChatCall>>,
    image_history: Mutex<Vec<ImageParams>>,
}

impl DummyClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the canned responses from the provider section
    /// (`chat_response`, `image_url`).
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            chat_response: Mutex::new(config.chat_response.clone()),
            image_url: Mutex::new(config.image_url.clone()),
            ..Default::default()
        }
    }

    /// Every subsequent `chat` call returns exactly this string,
    /// regardless of prompt, until changed.
    pub fn set_chat_response(&self, response: impl Into<String>) {
        if let Ok(mut canned) = self.chat_response.lock() {
            *canned = Some(response.into());
        }
    }

    pub fn set_image_url(&self, url: impl Into<String>) {
        if let Ok(mut canned) = self.image_url.lock() {
            *canned = Some(url.into());
        }
    }

    /// Recorded chat calls, in call order.
    pub fn chat_history(&self) -> Vec<ChatCall> {
        self.chat_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Recorded image calls, in call order.
    pub fn image_history(&self) -> Vec<ImageParams> {
        self.image_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn clear_history(&self) {
        if let Ok(mut history) = self.chat_history.lock() {
            history.clear();
        }
        if let Ok(mut history) = self.image_history.lock() {
            history.clear();
        }
    }
}

#[async_trait]
impl LlmClient for DummyClient {
    async fn is_available(&self) -> bool {
        true
    }

    async fn available_models(&self) -> Result<Vec<String>> {
        Ok(vec!["dummy-model".to_string()])
    }

    fn chat_capability(self: Arc<Self>) -> Option<Arc<dyn ChatCapable>> {
        Some(self)
    }

    fn image_capability(self: Arc<Self>) -> Option<Arc<dyn ImageCapable>> {
        Some(self)
    }
}

#[async_trait]
impl ChatCapable for DummyClient {
    async fn chat(&self, prompt: &str, options: ChatOptions) -> Result<ChatResponse> {
        if let Ok(mut history) = self.chat_history.lock() {
            history.push(ChatCall {
                prompt: prompt.to_string(),
                options: options.clone(),
            });
        }

        let content = self
            .chat_response
            .lock()
            .ok()
            .and_then(|canned| canned.clone())
            .unwrap_or_else(|| format!("Dummy response to: {prompt}"));

        Ok(ChatResponse {
            content,
            model: Some("dummy".to_string()),
            raw: Value::Null,
            ..Default::default()
        })
    }
}

#[async_trait]
impl ImageCapable for DummyClient {
    async fn generate(&self, params: ImageParams) -> Result<ImageResponse> {
        if let Ok(mut history) = self.image_history.lock() {
            history.push(params.clone());
        }

        let url = self
            .image_url
            .lock()
            .ok()
            .and_then(|canned| canned.clone())
            .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());

        Ok(ImageResponse {
            url: Some(url),
            raw: Value::Null,
            ..Default::default()
        })
    }
}

//! OpenAI 客户端 — chat completions 与 DALL-E 图像生成
//!
//! OpenAI API adapter, covering chat completions and image generation.
//! Wire-format notes:
//! - A `system` option becomes a synthesized system-role message
//!   prepended to the flat `messages` array (no separate field).
//! - Response text lives at `choices[0].message.content`; a missing
//!   path yields an empty string, not an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{ChatCapable, ImageCapable, LlmClient};
use crate::config::ProviderConfig;
use crate::error::{ConfigError, RequestError};
use crate::transport::{Transport, TransportRequest};
use crate::types::{ChatMessage, ChatOptions, ChatResponse, ImageParams, ImageResponse, TokenUsage};
use crate::Result;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

const ERROR_CHAT_FAILED: &str = "OpenAI chat request failed";
const ERROR_IMAGE_FAILED: &str = "OpenAI image request failed";

/// OpenAI API adapter.
pub struct OpenAiClient {
    provider: String,
    config: ProviderConfig,
    transport: Arc<dyn Transport>,
}

impl OpenAiClient {
    pub fn new(
        provider: impl Into<String>,
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
    ) -> std::result::Result<Self, ConfigError> {
        let provider = provider.into();
        config.require_api_key(&provider)?;

        Ok(Self {
            provider,
            config,
            transport,
        })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn request(&self, method: &str, path: &str, body: Option<Value>) -> TransportRequest {
        let mut request = TransportRequest {
            method: method.to_string(),
            url: format!("{}{}", self.base_url(), path),
            headers: Vec::new(),
            body,
            timeout: self.config.timeout_secs.map(Duration::from_secs),
        };
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        request = request.header("authorization", format!("Bearer {api_key}"));
        request
    }

    fn build_chat_payload(&self, prompt: &str, options: &ChatOptions) -> Value {
        let mut messages = options
            .messages
            .clone()
            .unwrap_or_else(|| vec![ChatMessage::user(prompt)]);

        if let Some(system) = &options.system {
            messages.insert(0, ChatMessage::system(system.clone()));
        }

        let model = options
            .model
            .as_deref()
            .or(self.config.chat_model.as_deref())
            .unwrap_or(DEFAULT_CHAT_MODEL);

        let mut payload = json!({
            "model": model,
            "messages": messages,
        });

        if let Some(temperature) = options.temperature {
            payload["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }
        if let Some(top_p) = options.top_p {
            payload["top_p"] = json!(top_p);
        }

        payload
    }

    fn parse_chat_response(data: Value, latency_ms: f64) -> ChatResponse {
        let content = data
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let usage = data.get("usage").map(|u| TokenUsage {
            prompt_tokens: u["prompt_tokens"].as_u64().unwrap_or(0),
            completion_tokens: u["completion_tokens"].as_u64().unwrap_or(0),
            total_tokens: u["total_tokens"].as_u64().unwrap_or(0),
        });

        ChatResponse {
            content,
            model: data.get("model").and_then(|v| v.as_str()).map(String::from),
            id: data.get("id").and_then(|v| v.as_str()).map(String::from),
            latency_ms: Some(latency_ms),
            usage,
            raw: data,
        }
    }

    fn build_image_payload(&self, params: &ImageParams) -> Value {
        let model = params
            .model
            .as_deref()
            .or(self.config.image_model.as_deref())
            .unwrap_or(DEFAULT_IMAGE_MODEL);

        json!({
            "model": model,
            "prompt": params.prompt,
            "size": params.size,
            "n": params.samples.unwrap_or(1),
        })
    }

    fn parse_image_response(data: Value) -> ImageResponse {
        let image = data.pointer("/data/0").cloned().unwrap_or(Value::Null);

        ImageResponse {
            url: image.get("url").and_then(|v| v.as_str()).map(String::from),
            base64: image
                .get("b64_json")
                .and_then(|v| v.as_str())
                .map(String::from),
            revised_prompt: image
                .get("revised_prompt")
                .and_then(|v| v.as_str())
                .map(String::from),
            raw: data,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn is_available(&self) -> bool {
        match self.transport.send(self.request("GET", "/models", None)).await {
            Ok(response) => response.is_success(),
            Err(e) => {
                debug!(provider = %self.provider, error = %e, "availability probe failed");
                false
            }
        }
    }

    async fn available_models(&self) -> Result<Vec<String>> {
        let response = self
            .transport
            .send(self.request("GET", "/models", None))
            .await
            .map_err(|e| RequestError::transport("error fetching OpenAI models", e))?;

        if !response.is_success() {
            return Err(RequestError::from_response(
                "failed to fetch OpenAI models",
                response.status,
                response.json(),
            )
            .into());
        }

        let data = response.json().unwrap_or(Value::Null);
        let models = data
            .get("data")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|m| m.get("id").and_then(|v| v.as_str()))
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    fn chat_capability(self: Arc<Self>) -> Option<Arc<dyn ChatCapable>> {
        Some(self)
    }

    fn image_capability(self: Arc<Self>) -> Option<Arc<dyn ImageCapable>> {
        Some(self)
    }
}

#[async_trait]
impl ChatCapable for OpenAiClient {
    async fn chat(&self, prompt: &str, options: ChatOptions) -> Result<ChatResponse> {
        let payload = self.build_chat_payload(prompt, &options);
        debug!(provider = %self.provider, model = %payload["model"], "sending chat completion request");

        let started = Instant::now();
        let response = self
            .transport
            .send(self.request("POST", "/chat/completions", Some(payload)))
            .await
            .map_err(|e| RequestError::transport(ERROR_CHAT_FAILED, e))?;

        if !response.is_success() {
            return Err(RequestError::from_response(
                ERROR_CHAT_FAILED,
                response.status,
                response.json(),
            )
            .into());
        }

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        let data = response.json().unwrap_or(Value::Null);

        Ok(Self::parse_chat_response(data, latency_ms))
    }
}

#[async_trait]
impl ImageCapable for OpenAiClient {
    async fn generate(&self, params: ImageParams) -> Result<ImageResponse> {
        let payload = self.build_image_payload(&params);

        let response = self
            .transport
            .send(self.request("POST", "/images/generations", Some(payload)))
            .await
            .map_err(|e| RequestError::transport(ERROR_IMAGE_FAILED, e))?;

        if !response.is_success() {
            return Err(RequestError::from_response(
                ERROR_IMAGE_FAILED,
                response.status,
                response.json(),
            )
            .into());
        }

        let data = response.json().unwrap_or(Value::Null);
        Ok(Self::parse_image_response(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpTransport;

    fn client() -> OpenAiClient {
        let config = ProviderConfig::new("openai").api_key("sk-test");
        OpenAiClient::new("openai", config, Arc::new(HttpTransport::new().unwrap())).unwrap()
    }

    #[test]
    fn test_system_option_is_prepended_as_message() {
        let options = ChatOptions::new().system("You are terse.");
        let payload = client().build_chat_payload("Hello", &options);

        let messages = payload["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You are terse.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Hello");
    }

    #[test]
    fn test_optional_fields_are_omitted_when_unset() {
        let payload = client().build_chat_payload("Hello", &ChatOptions::default());
        assert!(payload.get("temperature").is_none());
        assert!(payload.get("max_tokens").is_none());
        assert!(payload.get("top_p").is_none());

        let options = ChatOptions::new().temperature(0.2).max_tokens(256);
        let payload = client().build_chat_payload("Hello", &options);
        assert_eq!(payload["temperature"], 0.2);
        assert_eq!(payload["max_tokens"], 256);
    }

    #[test]
    fn test_missing_content_path_yields_empty_string() {
        let resp = OpenAiClient::parse_chat_response(json!({"choices": []}), 1.0);
        assert_eq!(resp.content, "");
        assert!(resp.is_empty());
    }

    #[test]
    fn test_parse_chat_response() {
        let data = json!({
            "id": "chatcmpl-1",
            "model": "gpt-4.1-mini",
            "choices": [{"message": {"role": "assistant", "content": "Hi there!"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });
        let resp = OpenAiClient::parse_chat_response(data, 42.0);
        assert_eq!(resp.content, "Hi there!");
        assert_eq!(resp.model.as_deref(), Some("gpt-4.1-mini"));
        assert_eq!(resp.id.as_deref(), Some("chatcmpl-1"));
        assert_eq!(resp.latency_ms, Some(42.0));
        assert_eq!(resp.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_parse_image_response() {
        let data = json!({
            "data": [{"url": "https://img.example/cat.png", "revised_prompt": "A fluffy cat"}]
        });
        let resp = OpenAiClient::parse_image_response(data);
        assert_eq!(resp.url.as_deref(), Some("https://img.example/cat.png"));
        assert_eq!(resp.revised_prompt.as_deref(), Some("A fluffy cat"));
        assert!(resp.base64.is_none());
    }

    #[test]
    fn test_image_payload_defaults() {
        let payload = client().build_image_payload(&ImageParams::new("A cat"));
        assert_eq!(payload["model"], DEFAULT_IMAGE_MODEL);
        assert_eq!(payload["size"], "1024x1024");
        assert_eq!(payload["n"], 1);
    }
}

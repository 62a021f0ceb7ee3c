//! Anthropic 客户端 — Messages API 的请求/响应格式转换
//!
//! Anthropic Messages API adapter. Key differences from the OpenAI
//! format:
//! - `system` is a top-level payload field, never folded into `messages`.
//! - `max_tokens` is mandatory; a default applies when the caller omits it.
//! - Response content is an array of typed blocks; text assembly
//!   concatenates every `"text"` block and silently skips other types.
//! - Usage reports `input_tokens`/`output_tokens`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{ChatCapable, LlmClient};
use crate::config::ProviderConfig;
use crate::error::{ConfigError, RequestError};
use crate::transport::{Transport, TransportRequest};
use crate::types::{ChatMessage, ChatOptions, ChatResponse, TokenUsage};
use crate::Result;

const API_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_CHAT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_MAX_TOKENS: u32 = 4096;

const ENDPOINT_MESSAGES: &str = "/messages";
const ENDPOINT_MODELS: &str = "/models";

const ERROR_CHAT_FAILED: &str = "Anthropic chat request failed";

/// Anthropic Messages API adapter (chat only).
pub struct AnthropicClient {
    provider: String,
    config: ProviderConfig,
    transport: Arc<dyn Transport>,
}

impl AnthropicClient {
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
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        TransportRequest {
            method: method.to_string(),
            url: format!("{}{}", self.base_url(), path),
            headers: Vec::new(),
            body,
            timeout: self.config.timeout_secs.map(Duration::from_secs),
        }
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
    }

    fn build_chat_payload(&self, prompt: &str, options: &ChatOptions) -> Value {
        let messages = options
            .messages
            .clone()
            .unwrap_or_else(|| vec![ChatMessage::user(prompt)]);

        let model = options
            .model
            .as_deref()
            .or(self.config.chat_model.as_deref())
            .unwrap_or(DEFAULT_CHAT_MODEL);

        let mut payload = json!({
            "model": model,
            "messages": messages,
            "max_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        if let Some(system) = &options.system {
            payload["system"] = json!(system);
        }
        if let Some(temperature) = options.temperature {
            payload["temperature"] = json!(temperature);
        }
        if let Some(top_p) = options.top_p {
            payload["top_p"] = json!(top_p);
        }
        if let Some(top_k) = options.top_k {
            payload["top_k"] = json!(top_k);
        }

        payload
    }

    /// Concatenate the `text` field of every `"text"` block, skipping
    /// other block types.
    fn collect_text(data: &Value) -> String {
        data.get("content")
            .and_then(|c| c.as_array())
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parse_usage(data: &Value) -> TokenUsage {
        data.get("usage")
            .map(|u| {
                let prompt_tokens = u["input_tokens"].as_u64().unwrap_or(0);
                let completion_tokens = u["output_tokens"].as_u64().unwrap_or(0);
                TokenUsage {
                    prompt_tokens,
                    completion_tokens,
                    total_tokens: prompt_tokens + completion_tokens,
                }
            })
            .unwrap_or_default()
    }

    fn parse_chat_response(data: Value, latency_ms: f64) -> ChatResponse {
        ChatResponse {
            content: Self::collect_text(&data),
            model: data.get("model").and_then(|v| v.as_str()).map(String::from),
            id: data.get("id").and_then(|v| v.as_str()).map(String::from),
            latency_ms: Some(latency_ms),
            usage: Some(Self::parse_usage(&data)),
            raw: data,
        }
    }

    /// Pull model ids out of a listing response. Accepts both a bare
    /// array and the `data`-wrapped shape.
    fn parse_model_list(data: &Value) -> Vec<String> {
        let items = data
            .get("data")
            .and_then(|v| v.as_array())
            .or_else(|| data.as_array());

        items
            .map(|items| {
                items
                    .iter()
                    .filter_map(|m| m.get("id").and_then(|v| v.as_str()))
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn is_available(&self) -> bool {
        match self
            .transport
            .send(self.request("GET", ENDPOINT_MODELS, None))
            .await
        {
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
            .send(self.request("GET", ENDPOINT_MODELS, None))
            .await
            .map_err(|e| RequestError::transport("error fetching Anthropic models", e))?;

        if !response.is_success() {
            return Err(RequestError::from_response(
                "failed to fetch Anthropic models",
                response.status,
                response.json(),
            )
            .into());
        }

        let data = response.json().unwrap_or(Value::Null);
        Ok(Self::parse_model_list(&data))
    }

    fn chat_capability(self: Arc<Self>) -> Option<Arc<dyn ChatCapable>> {
        Some(self)
    }
}

#[async_trait]
impl ChatCapable for AnthropicClient {
    async fn chat(&self, prompt: &str, options: ChatOptions) -> Result<ChatResponse> {
        let payload = self.build_chat_payload(prompt, &options);
        debug!(provider = %self.provider, model = %payload["model"], "sending messages request");

        let started = Instant::now();
        let response = self
            .transport
            .send(self.request("POST", ENDPOINT_MESSAGES, Some(payload)))
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

//! ModelsLab 客户端 — text2img 图像生成
//!
//! ModelsLab text-to-image adapter. Quirks this adapter absorbs:
//! - Size arrives as one `"WIDTHxHEIGHT"` string and must be sent as
//!   independent width/height fields; malformed sizes fall back to
//!   1024x1024 instead of erroring.
//! - The vendor can return HTTP 2xx with an internal `status: "error"`
//!   envelope; that is still a request failure.
//! - There is no model-listing endpoint; the catalog is a fixed
//!   snapshot and must not be treated as authoritative.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{ImageCapable, LlmClient};
use crate::config::ProviderConfig;
use crate::error::{ConfigError, RequestError};
use crate::transport::{Transport, TransportRequest};
use crate::types::{ImageParams, ImageResponse};
use crate::Result;

const DEFAULT_BASE_URL: &str = "https://modelslab.com/api/v6";
const ENDPOINT_TEXT2IMG: &str = "/images/text2img";

const DEFAULT_MODEL: &str = "flux";
const DEFAULT_DIMENSION: u32 = 1024;
const DEFAULT_SAMPLES: u32 = 1;
const DEFAULT_STEPS: u32 = 30;
const DEFAULT_GUIDANCE_SCALE: f64 = 7.5;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ERROR_IMAGE_FAILED: &str = "ModelsLab image generation request failed";

/// Vendor snapshot of commonly offered models; there is no live
/// endpoint to derive this from.
const MODEL_CATALOG: &[&str] = &[
    "flux",
    "flux-dev",
    "sdxl",
    "realistic-vision-v6",
    "dreamshaper-8",
    "anything-v5",
];

/// ModelsLab API adapter (image generation only).
pub struct ModelsLabClient {
    provider: String,
    config: ProviderConfig,
    transport: Arc<dyn Transport>,
}

impl ModelsLabClient {
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

    fn request(&self, path: &str, body: Value) -> TransportRequest {
        let timeout = self.config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        TransportRequest::post(format!("{}{}", self.base_url(), path), body)
            .timeout(Duration::from_secs(timeout))
    }

    /// Split `"800x600"` into `(800, 600)`. Anything unparseable falls
    /// back to the 1024x1024 default.
    fn parse_size(size: &str) -> (u32, u32) {
        match size.split_once('x') {
            Some((width, height)) => (
                width.trim().parse().unwrap_or(DEFAULT_DIMENSION),
                height.trim().parse().unwrap_or(DEFAULT_DIMENSION),
            ),
            None => (DEFAULT_DIMENSION, DEFAULT_DIMENSION),
        }
    }

    /// The vendor's soft-failure envelope: HTTP success carrying
    /// `status: "error"`. Returns the vendor message when present (the
    /// API spells it `message` or, historically, `messege`).
    fn soft_error(data: &Value) -> Option<String> {
        if data.get("status").and_then(|s| s.as_str()) != Some("error") {
            return None;
        }

        let message = data
            .get("message")
            .or_else(|| data.get("messege"))
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");

        Some(message.to_string())
    }

    fn build_payload(&self, params: &ImageParams) -> Value {
        let (width, height) = Self::parse_size(&params.size);

        let model = params
            .model
            .as_deref()
            .or(self.config.image_model.as_deref())
            .unwrap_or(DEFAULT_MODEL);

        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        // The vendor expects most numeric fields as strings.
        let mut payload = json!({
            "key": api_key,
            "prompt": params.prompt,
            "model_id": model,
            "width": width.to_string(),
            "height": height.to_string(),
            "samples": params.samples.unwrap_or(DEFAULT_SAMPLES).to_string(),
            "num_inference_steps": params.steps.unwrap_or(DEFAULT_STEPS).to_string(),
            "guidance_scale": params.guidance_scale.unwrap_or(DEFAULT_GUIDANCE_SCALE),
            "safety_checker": "no",
        });

        if let Some(negative_prompt) = params.negative_prompt.as_deref() {
            if !negative_prompt.is_empty() {
                payload["negative_prompt"] = json!(negative_prompt);
            }
        }
        if let Some(seed) = params.seed {
            payload["seed"] = json!(seed);
        }

        payload
    }
}

#[async_trait]
impl LlmClient for ModelsLabClient {
    async fn is_available(&self) -> bool {
        // Minimal single-step probe; the vendor has no health endpoint.
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let probe = json!({
            "key": api_key,
            "prompt": "test",
            "model_id": DEFAULT_MODEL,
            "width": "64",
            "height": "64",
            "samples": "1",
            "num_inference_steps": "1",
        });

        match self
            .transport
            .send(self.request(ENDPOINT_TEXT2IMG, probe))
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
        Ok(MODEL_CATALOG.iter().map(|m| m.to_string()).collect())
    }

    fn image_capability(self: Arc<Self>) -> Option<Arc<dyn ImageCapable>> {
        Some(self)
    }
}

#[async_trait]
impl ImageCapable for ModelsLabClient {
    async fn generate(&self, params: ImageParams) -> Result<ImageResponse> {
        let payload = self.build_payload(&params);
        debug!(provider = %self.provider, model = %payload["model_id"], "sending text2img request");

        let response = self
            .transport
            .send(self.request(ENDPOINT_TEXT2IMG, payload))
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

        if let Some(message) = Self::soft_error(&data) {
            return Err(RequestError::new(format!("ModelsLab API error: {message}"))
                .with_status(response.status)
                .with_body(data)
                .into());
        }

        let url = data
            .pointer("/output/0")
            .and_then(|v| v.as_str())
            .map(String::from);

        Ok(ImageResponse {
            url,
            raw: data,
            ..Default::default()
        })
    }
}

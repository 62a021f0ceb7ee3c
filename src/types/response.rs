//! Normalized response types returned by every adapter.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a chat completion call, identical across vendors.
///
/// `content` is empty only when the vendor genuinely returned no text;
/// the wrapper never substitutes placeholder text. `raw` preserves the
/// full vendor payload for callers that need fields the normalization
/// drops.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub content: String,
    pub raw: Value,
    pub model: Option<String>,
    pub id: Option<String>,
    /// Wall-clock time of the network exchange. Telemetry only.
    pub latency_ms: Option<f64>,
    pub usage: Option<TokenUsage>,
}

impl ChatResponse {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Display for ChatResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// Result of an image generation call.
///
/// At least the requested representation is populated on success.
#[derive(Debug, Clone, Default)]
pub struct ImageResponse {
    pub url: Option<String>,
    pub base64: Option<String>,
    pub raw: Value,
    pub revised_prompt: Option<String>,
}

impl ImageResponse {
    pub fn has_url(&self) -> bool {
        self.url.as_deref().map_or(false, |u| !u.is_empty())
    }

    pub fn has_base64(&self) -> bool {
        self.base64.as_deref().map_or(false, |b| !b.is_empty())
    }

    /// The image data, preferring the URL over base64 when both exist.
    pub fn data(&self) -> Option<&str> {
        self.url.as_deref().or(self.base64.as_deref())
    }
}

/// Raw token counters as reported by the vendor.
///
/// `Default` is the all-zero sentinel used when a vendor omits usage
/// reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prompt_tokens == 0 && self.completion_tokens == 0 && self.total_tokens == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_display_is_content() {
        let resp = ChatResponse {
            content: "Hello!".into(),
            ..Default::default()
        };
        assert_eq!(resp.to_string(), "Hello!");
        assert!(!resp.is_empty());
    }

    #[test]
    fn test_image_data_prefers_url() {
        let resp = ImageResponse {
            url: Some("https://img.example/a.png".into()),
            base64: Some("aGVsbG8=".into()),
            ..Default::default()
        };
        assert_eq!(resp.data(), Some("https://img.example/a.png"));
    }

    #[test]
    fn test_image_data_falls_back_to_base64() {
        let resp = ImageResponse {
            base64: Some("aGVsbG8=".into()),
            ..Default::default()
        };
        assert!(!resp.has_url());
        assert_eq!(resp.data(), Some("aGVsbG8="));
    }

    #[test]
    fn test_token_usage_empty_sentinel() {
        assert!(TokenUsage::default().is_empty());
        assert!(!TokenUsage::new(10, 5, 15).is_empty());
    }
}

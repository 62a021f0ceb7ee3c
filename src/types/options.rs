//! Per-call option structs.
//!
//! These replace a loose options map with explicit fields. The contract
//! for every field is the same: a vendor payload only carries it when
//! the caller set it; defaults live in the adapters, not here.

use super::ChatMessage;

/// Options for a chat completion call. All fields optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Model id; falls back to the provider's `chat_model`, then the
    /// adapter default.
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    /// System prompt. Adapters place it wherever their vendor expects
    /// it (prepended message vs. top-level field).
    pub system: Option<String>,
    /// Full multi-turn history. When set, the per-call prompt is
    /// ignored and this is sent verbatim.
    pub messages: Option<Vec<ChatMessage>>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = Some(messages);
        self
    }
}

/// Default image size when the caller does not specify one.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Parameters for an image generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub prompt: String,
    /// `"WIDTHxHEIGHT"`; adapters that need separate dimensions split it
    /// themselves.
    pub size: String,
    pub model: Option<String>,
    pub negative_prompt: Option<String>,
    pub seed: Option<i64>,
    pub samples: Option<u32>,
    pub steps: Option<u32>,
    pub guidance_scale: Option<f64>,
}

impl ImageParams {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: DEFAULT_IMAGE_SIZE.to_string(),
            model: None,
            negative_prompt: None,
            seed: None,
            samples: None,
            steps: None,
            guidance_scale: None,
        }
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn samples(mut self, samples: u32) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn guidance_scale(mut self, guidance_scale: f64) -> Self {
        self.guidance_scale = Some(guidance_scale);
        self
    }
}

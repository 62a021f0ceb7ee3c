//! # llm-suite-rust
//!
//! 统一的多厂商 LLM 客户端层：provider 注册、能力契约与 wire 格式归一化。
//!
//! A provider-agnostic abstraction over multiple LLM vendor APIs (chat
//! completion and image generation). Callers issue one uniform request;
//! providers can be swapped, extended, or mocked without touching call
//! sites.
//!
//! ## Overview
//!
//! The crate is the provider resolution and normalization layer: a
//! registry that maps a provider name to a lazily built, cached adapter
//! instance, capability contracts each adapter satisfies, per-vendor
//! request/response translation, and an error taxonomy that turns
//! vendor-specific failures into a uniform shape.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_suite::{ChatOptions, LlmConfig, LlmManager, ProviderConfig};
//!
//! #[tokio::main]
//! async fn main() -> llm_suite::Result<()> {
//!     let config = LlmConfig::new("openai")
//!         .with_provider("openai", ProviderConfig::new("openai").api_key("sk-..."))
//!         .with_provider("claude", ProviderConfig::new("anthropic").api_key("sk-ant-..."));
//!
//!     let mut manager = LlmManager::new(config)?;
//!
//!     let answer = manager.chat("Hello!", ChatOptions::default()).await?;
//!     println!("{answer}");
//!
//!     let answer = manager.using("claude").chat("Hello!", ChatOptions::default()).await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`manager`] | Provider resolution, instance cache, custom drivers |
//! | [`drivers`] | Capability contracts and per-vendor adapters |
//! | [`types`] | Provider-independent request/response types |
//! | [`config`] | Provider map consumed at manager construction |
//! | [`transport`] | Injectable HTTP capability (reqwest default) |
//! | [`error`] | `ConfigError` / `RequestError` taxonomy |

pub mod config;
pub mod drivers;
pub mod error;
pub mod manager;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use config::{LlmConfig, ProviderConfig};
pub use drivers::{
    AnthropicClient, ChatCapable, DummyClient, ImageCapable, LlmClient, ModelsLabClient,
    OpenAiClient,
};
pub use error::{ConfigError, Error, RequestError};
pub use manager::{DriverFactory, LlmManager};
pub use transport::{HttpTransport, Transport};
pub use types::{
    ChatMessage, ChatOptions, ChatResponse, ImageParams, ImageResponse, MessageRole, TokenUsage,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

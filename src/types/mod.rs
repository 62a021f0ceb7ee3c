//! 类型模块：定义 provider 无关的请求/响应核心数据类型。
//!
//! # Types Module
//!
//! Provider-independent value types. Everything a caller sends or
//! receives goes through these shapes; vendor wire formats never leak
//! past the adapter layer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ChatMessage`] | A single chat turn with role and content |
//! | [`ChatOptions`] | Per-call chat tuning knobs, all optional |
//! | [`ImageParams`] | Image generation parameters |
//! | [`ChatResponse`] | Normalized chat completion result |
//! | [`ImageResponse`] | Normalized image generation result |
//! | [`TokenUsage`] | Raw token counters when a vendor reports them |

pub mod message;
pub mod options;
pub mod response;

pub use message::{ChatMessage, MessageRole};
pub use options::{ChatOptions, ImageParams};
pub use response::{ChatResponse, ImageResponse, TokenUsage};

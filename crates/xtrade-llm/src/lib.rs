//! LLM provider abstraction layer for xtrade
//!
//! Provider-agnostic chat completion types plus concrete providers behind
//! feature flags. xtrade only needs plain text conversations, so content is
//! always a string.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

#[cfg(feature = "openai")]
pub mod providers;

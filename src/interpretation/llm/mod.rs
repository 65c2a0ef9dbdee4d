//! LLM provider abstraction layer.
//!
//! The interpreter talks to a chat-completion backend through [`LlmProvider`]; the only
//! concrete backend is the OpenAI-compatible one.

mod openai;
mod provider;
mod types;

pub use openai::{ApiKeySource, OpenAIProvider};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};

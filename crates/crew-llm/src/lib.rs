//! LLM provider abstraction layer for stock-crew
//!
//! This crate provides provider-agnostic types for talking to a chat model:
//!
//! - Message types, including tool calls and tool results
//! - Completion request/response types
//! - Tool definitions for function calling
//! - The [`LLMProvider`] trait
//! - A Groq provider speaking the OpenAI chat-completions format
//! - A scripted provider for deterministic tests

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod scripted;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, Role, ToolCall};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

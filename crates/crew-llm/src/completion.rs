//! Completion request and response types
//!
//! A request is built by chaining `with_*` calls on [`CompletionRequest::new`];
//! nothing is validated until a provider sends it.

use crate::{Message, Role, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Token budget used when a request does not set one
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// One chat completion call: model, conversation and sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,

    /// Full conversation, oldest first
    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub max_tokens: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Tools the model may call; empty means plain chat
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    /// Empty conversation for `model`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            tools: Vec::new(),
        }
    }

    /// Replace the conversation
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Append one message
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set or clear the sampling temperature
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Text of the last user message, if any
    pub fn last_user_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(Message::text)
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    /// Output was cut at the token budget
    MaxTokens,
    /// The model is waiting for tool results
    ToolUse,
}

/// Token counts reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// Assistant reply to a [`CompletionRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    #[serde(default)]
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Reply whose stop reason follows from its content
    ///
    /// Messages carrying tool calls stop with `ToolUse`, anything else with
    /// `EndTurn`. Usage is left at zero.
    pub fn from_message(message: Message) -> Self {
        let stop_reason = if message.has_tool_calls() {
            StopReason::ToolUse
        } else {
            StopReason::EndTurn
        };
        Self {
            message,
            stop_reason,
            usage: TokenUsage::default(),
        }
    }

    /// Attach provider-reported usage
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

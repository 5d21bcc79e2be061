//! Scripted provider for deterministic tests
//!
//! [`ScriptedProvider`] replays a fixed queue of responses and records every
//! request it receives, so stage and pipeline tests never touch the network.

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message, Result,
    Role,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Provider that answers from a queue of canned responses
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain text answer
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(Ok(text_reply(text)));
        self
    }

    /// Queue a single tool call
    pub fn with_tool_call(self, id: &str, name: &str, input: Value) -> Self {
        self.push(Ok(tool_call_reply(id, name, input)));
        self
    }

    /// Queue a failure
    pub fn with_error(self, error: LLMError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue an arbitrary response
    pub fn push(&self, response: Result<CompletionResponse>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of queued responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(LLMError::UnexpectedResponse(
                    "scripted provider has no responses left".to_string(),
                ))
            })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Build an end-of-turn text response
pub fn text_reply(text: impl Into<String>) -> CompletionResponse {
    CompletionResponse::from_message(Message::assistant(text))
}

/// Build a response requesting one tool call
pub fn tool_call_reply(id: &str, name: &str, input: Value) -> CompletionResponse {
    CompletionResponse::from_message(Message {
        role: Role::Assistant,
        content: vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }],
    })
}

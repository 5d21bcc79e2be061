//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors a tool can report
#[derive(Error, Debug)]
pub enum ToolError {
    /// The argument was missing or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The underlying client failed
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    /// Wrap any displayable error as a tool failure
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

/// The single named argument a tool accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolArgument {
    /// Field name in the call's JSON arguments
    pub name: &'static str,
    /// Description shown to the model
    pub description: &'static str,
}

impl ToolArgument {
    /// Create a new argument description
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }

    /// Read the argument out of a tool call's JSON input
    ///
    /// Models do not always follow the schema, so this accepts
    /// `{"<name>": "..."}`, a bare JSON string, or anything else as raw JSON
    /// text.
    pub fn extract(&self, input: &Value) -> String {
        match input {
            Value::Object(map) => match map.get(self.name) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => input.to_string(),
            },
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Trait for tools that stages can call
///
/// Implementors only provide [`Tool::run`]; [`Tool::invoke`] wraps it with
/// argument extraction and the error-to-text policy.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    ///
    /// This description helps the LLM understand when to use this tool
    fn description(&self) -> &str;

    /// The argument this tool reads
    fn argument(&self) -> ToolArgument;

    /// Run the tool on its extracted argument
    async fn run(&self, input: &str) -> Result<String, ToolError>;

    /// Run the tool for a model-issued call, never failing
    async fn invoke(&self, input: &Value) -> String {
        let argument = self.argument().extract(input);
        debug!(tool = self.name(), argument = %argument, "Invoking tool");

        match self.run(&argument).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = self.name(), "Tool failed: {e}");
                format!("Error: {e}")
            }
        }
    }
}

//! Agent executor for running stage loops
//!
//! The AgentExecutor implements the tool loop behind every stage:
//! 1. Call the LLM with the conversation so far and the stage's tools
//! 2. If the reply requests tools, run them and append their results
//! 3. Otherwise the reply text is the final answer
//!
//! The loop is bounded by `max_iterations`. When the bound is hit, one last
//! request is sent without tools, asking the model for its final answer.

use async_trait::async_trait;
use crew_core::{Error, Result};
use crew_llm::{CompletionRequest, LLMProvider, Message, StopReason, ToolCall, ToolDefinition};
use crew_tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Prompt appended when the iteration bound is reached
pub const FINAL_ANSWER_PROMPT: &str = "Now it's time you MUST give your absolute best final answer. \
You'll ignore all previous instructions, stop using any tools, and just return your absolute BEST Final answer.";

/// Event handler for executor events
///
/// Implement this trait to observe tool activity while a stage runs.
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    /// Called when a tool execution starts
    async fn on_tool_start(&self, _name: &str, _input: &Value) {}

    /// Called when a tool execution completes
    async fn on_tool_done(&self, _name: &str, _output: &str, _duration_ms: u64) {}
}

/// No-op event handler for when events are not needed
pub struct NoOpEventHandler;

#[async_trait]
impl ExecutorEventHandler for NoOpEventHandler {}

/// Configuration for one executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of tool-loop iterations
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: crate::DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            temperature: Some(0.7),
        }
    }
}

/// Executes a stage loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tools: ToolRegistry,
    config: ExecutorConfig,
    event_handler: Arc<dyn ExecutorEventHandler>,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(provider: Arc<dyn LLMProvider>, tools: ToolRegistry, config: ExecutorConfig) -> Self {
        Self {
            provider,
            tools,
            config,
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = handler;
        self
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Tools available to this executor
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the loop for one user prompt under the given system prompt
    ///
    /// Returns the model's final answer text.
    pub async fn run(&self, system_prompt: &str, user_prompt: String) -> Result<String> {
        let mut conversation = vec![Message::user(user_prompt)];
        let tools = self.build_tool_definitions();

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration = iteration,
                max_iterations = self.config.max_iterations,
                tool_count = tools.len(),
                "Stage iteration started"
            );

            let request = self.request(system_prompt, &conversation, tools.clone());
            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| Error::Llm(e.to_string()))?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let message = response.message;
            if message.has_tool_calls() {
                let results = self.execute_tools(&message.tool_calls()).await;
                conversation.push(message);
                conversation.extend(results);
                continue;
            }

            if response.stop_reason == StopReason::MaxTokens {
                warn!("Hit max tokens in LLM response, returning truncated answer");
            }

            return final_text(&message);
        }

        warn!(
            "Max iterations ({}) reached, requesting final answer",
            self.config.max_iterations
        );
        conversation.push(Message::user(FINAL_ANSWER_PROMPT));

        let request = self.request(system_prompt, &conversation, Vec::new());
        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        final_text(&response.message)
    }

    fn request(
        &self,
        system_prompt: &str,
        conversation: &[Message],
        tools: Vec<ToolDefinition>,
    ) -> CompletionRequest {
        CompletionRequest::new(&self.config.model)
            .with_messages(conversation.to_vec())
            .with_system(system_prompt)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
            .with_tools(tools)
    }

    /// Build tool definitions from the registry
    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .list_tools()
            .iter()
            .map(|tool| {
                let argument = tool.argument();
                ToolDefinition::single_string(
                    tool.name(),
                    tool.description(),
                    argument.name,
                    argument.description,
                )
            })
            .collect()
    }

    /// Run every requested tool in order, one result message per call
    async fn execute_tools(&self, calls: &[ToolCall<'_>]) -> Vec<Message> {
        info!(tool_count = calls.len(), "Starting tool execution");
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let input_preview: String = call.input.to_string().chars().take(500).collect();
            info!(
                tool_name = %call.name,
                tool_id = %call.id,
                input_preview = %input_preview,
                "Executing tool"
            );

            let Some(tool) = self.tools.get(call.name) else {
                warn!(tool_name = %call.name, "Model requested an unknown tool");
                results.push(Message::tool_error(
                    call.id,
                    format!(
                        "Error: tool '{}' does not exist. Available tools: {}",
                        call.name,
                        self.tools.names().join(", ")
                    ),
                ));
                continue;
            };

            self.event_handler.on_tool_start(call.name, call.input).await;

            let start_time = Instant::now();
            let output = tool.invoke(call.input).await;
            let duration_ms = start_time.elapsed().as_millis() as u64;

            let result_preview: String = output.chars().take(300).collect();
            debug!(
                tool_name = %call.name,
                duration_ms = duration_ms,
                result_preview = %result_preview,
                "Tool execution finished"
            );

            self.event_handler
                .on_tool_done(call.name, &output, duration_ms)
                .await;

            if output.starts_with("Error:") {
                results.push(Message::tool_error(call.id, output));
            } else {
                results.push(Message::tool_result(call.id, output));
            }
        }

        results
    }
}

fn final_text(message: &Message) -> Result<String> {
    message
        .text()
        .ok_or_else(|| Error::Llm("model returned an empty answer".to_string()))
}

//! Runtime holding the shared provider and stage defaults
//!
//! The CrewRuntime owns the LLM provider and the default executor settings,
//! and hands out configured [`StageAgent`]s.

use crate::executor::{AgentExecutor, ExecutorConfig, ExecutorEventHandler};
use crate::{Persona, StageAgent};
use crew_core::{Error, Result};
use crew_llm::LLMProvider;
use crew_tools::ToolRegistry;
use std::sync::Arc;

/// Default chat model
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Model used by every stage
    pub model: String,

    /// Tool-loop bound for every stage
    pub max_iterations: usize,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let executor = ExecutorConfig::default();
        Self {
            model: executor.model,
            max_iterations: executor.max_iterations,
            max_tokens: executor.max_tokens,
            temperature: executor.temperature,
        }
    }
}

impl RuntimeConfig {
    fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_iterations: self.max_iterations,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Shared resources for building stages
///
/// # Example
///
/// ```
/// use crew_llm::scripted::ScriptedProvider;
/// use crew_runtime::{CrewRuntime, Persona};
/// use crew_tools::ToolRegistry;
/// use std::sync::Arc;
///
/// let runtime = CrewRuntime::builder()
///     .provider(Arc::new(ScriptedProvider::new()))
///     .max_iterations(5)
///     .build()?;
///
/// let stage = runtime.stage(
///     Persona::new("Strategic Stock Trader", "Decide.", "Experienced trader."),
///     ToolRegistry::new(),
/// );
/// assert_eq!(stage.executor().config().max_iterations, 5);
/// # Ok::<(), crew_core::Error>(())
/// ```
pub struct CrewRuntime {
    provider: Arc<dyn LLMProvider>,
    config: RuntimeConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl CrewRuntime {
    /// Create a new runtime
    pub fn new(provider: Arc<dyn LLMProvider>, config: RuntimeConfig) -> Self {
        Self {
            provider,
            config,
            event_handler: None,
        }
    }

    /// Create a new runtime builder
    pub fn builder() -> CrewRuntimeBuilder {
        CrewRuntimeBuilder::default()
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Create a stage for a persona with its own tool set
    pub fn stage(&self, persona: Persona, tools: ToolRegistry) -> StageAgent {
        let mut executor =
            AgentExecutor::new(self.provider.clone(), tools, self.config.executor_config());
        if let Some(handler) = &self.event_handler {
            executor = executor.with_event_handler(handler.clone());
        }
        StageAgent::new(persona, executor)
    }
}

/// Builder for CrewRuntime
#[derive(Default)]
pub struct CrewRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    config: RuntimeConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl CrewRuntimeBuilder {
    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Observe tool activity in every stage created by the runtime
    pub fn event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the runtime
    pub fn build(self) -> Result<CrewRuntime> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;

        if self.config.max_iterations == 0 {
            return Err(Error::InitializationFailed(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(CrewRuntime {
            provider,
            config: self.config,
            event_handler: self.event_handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_llm::scripted::ScriptedProvider;

    #[test]
    fn test_builder_requires_provider() {
        let result = CrewRuntime::builder().build();
        assert!(matches!(result, Err(Error::InitializationFailed(_))));
    }

    #[test]
    fn test_builder_rejects_zero_iterations() {
        let result = CrewRuntime::builder()
            .provider(Arc::new(ScriptedProvider::new()))
            .max_iterations(0)
            .build();
        assert!(matches!(result, Err(Error::InitializationFailed(_))));
    }

    #[test]
    fn test_stage_inherits_config() {
        let runtime = CrewRuntime::builder()
            .provider(Arc::new(ScriptedProvider::new()))
            .model("llama-3.1-8b-instant")
            .max_tokens(512)
            .temperature(0.2)
            .build()
            .unwrap();

        let stage = runtime.stage(
            Persona::new("Financial Market Analyst", "Analyze.", "Expert."),
            ToolRegistry::new(),
        );
        let config = stage.executor().config();
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.max_iterations, 10);
        assert_eq!(runtime.provider().name(), "scripted");
    }
}

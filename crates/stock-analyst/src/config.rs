//! Configuration for the stock analyst

use crate::error::{Result, StockError};
use crew_llm::providers::GroqConfig;
use crew_llm::providers::groq::{DEFAULT_GROQ_API_BASE, GROQ_API_BASE_VAR, GROQ_API_KEY_VAR};
use crew_runtime::{DEFAULT_MODEL, RuntimeConfig};
use crew_utils::{EnvLookup, parse_var, read_var};
use std::time::Duration;

/// Environment variable holding the Tavily credential
pub const TAVILY_API_KEY_VAR: &str = "TAVILY_API_KEY";
/// Environment variable overriding the chat model
pub const ANALYST_MODEL_VAR: &str = "ANALYST_MODEL";
/// Environment variable overriding the history window in months
pub const ANALYST_HISTORY_MONTHS_VAR: &str = "ANALYST_HISTORY_MONTHS";
/// Environment variable overriding the tool-loop bound
pub const ANALYST_MAX_ITERATIONS_VAR: &str = "ANALYST_MAX_ITERATIONS";

/// Configuration for one dashboard session
#[derive(Debug, Clone)]
pub struct AnalystConfig {
    /// Groq API key (required)
    pub groq_api_key: String,

    /// Groq API base URL
    pub groq_api_base: String,

    /// Chat model used by both stages
    pub model: String,

    /// Tavily API key; search fails at call time without it
    pub tavily_api_key: Option<String>,

    /// Timeout for LLM, market data and search requests
    pub request_timeout: Duration,

    /// Tool-loop bound per stage
    pub max_iterations: usize,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Number of search results requested per query
    pub search_max_results: usize,

    /// Length of the price history window in months
    pub history_months: u32,
}

impl AnalystConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalystConfigBuilder {
        AnalystConfigBuilder::default()
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&crew_utils::env_lookup)
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let groq_api_key = read_var(lookup, GROQ_API_KEY_VAR).ok_or_else(|| {
            StockError::ConfigError(format!("{GROQ_API_KEY_VAR} environment variable not set"))
        })?;

        let mut builder = Self::builder().groq_api_key(groq_api_key);
        if let Some(base) = read_var(lookup, GROQ_API_BASE_VAR) {
            builder = builder.groq_api_base(base);
        }
        if let Some(model) = read_var(lookup, ANALYST_MODEL_VAR) {
            builder = builder.model(model);
        }
        if let Some(key) = read_var(lookup, TAVILY_API_KEY_VAR) {
            builder = builder.tavily_api_key(key);
        }
        if let Some(months) = parse_var(lookup, ANALYST_HISTORY_MONTHS_VAR)? {
            builder = builder.history_months(months);
        }
        if let Some(max) = parse_var(lookup, ANALYST_MAX_ITERATIONS_VAR)? {
            builder = builder.max_iterations(max);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.groq_api_key.trim().is_empty() {
            return Err(StockError::ConfigError(format!(
                "{GROQ_API_KEY_VAR} must not be empty"
            )));
        }

        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        if self.max_iterations == 0 {
            return Err(StockError::ConfigError(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(StockError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(StockError::ConfigError(format!(
                    "temperature must be between 0 and 2, got {t}"
                )));
            }
        }

        if !(1..=20).contains(&self.search_max_results) {
            return Err(StockError::ConfigError(
                "search_max_results must be between 1 and 20".to_string(),
            ));
        }

        if self.history_months == 0 {
            return Err(StockError::ConfigError(
                "history_months must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Provider settings for the Groq client
    pub fn groq_config(&self) -> GroqConfig {
        GroqConfig::new(&self.groq_api_key)
            .with_api_base(&self.groq_api_base)
            .with_timeout(self.request_timeout.as_secs())
    }

    /// Stage defaults for the crew runtime
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            model: self.model.clone(),
            max_iterations: self.max_iterations,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Builder for AnalystConfig
#[derive(Debug, Default)]
pub struct AnalystConfigBuilder {
    groq_api_key: Option<String>,
    groq_api_base: Option<String>,
    model: Option<String>,
    tavily_api_key: Option<String>,
    request_timeout: Option<Duration>,
    max_iterations: Option<usize>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    search_max_results: Option<usize>,
    history_months: Option<u32>,
}

impl AnalystConfigBuilder {
    /// Set the Groq API key
    pub fn groq_api_key(mut self, key: impl Into<String>) -> Self {
        self.groq_api_key = Some(key.into());
        self
    }

    /// Set the Groq API base URL
    pub fn groq_api_base(mut self, base: impl Into<String>) -> Self {
        self.groq_api_base = Some(base.into());
        self
    }

    /// Set the chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the Tavily API key
    pub fn tavily_api_key(mut self, key: impl Into<String>) -> Self {
        self.tavily_api_key = Some(key.into());
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the tool-loop bound
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set search results per query
    pub fn search_max_results(mut self, count: usize) -> Self {
        self.search_max_results = Some(count);
        self
    }

    /// Set the history window in months
    pub fn history_months(mut self, months: u32) -> Self {
        self.history_months = Some(months);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AnalystConfig> {
        let groq_api_key = self.groq_api_key.ok_or_else(|| {
            StockError::ConfigError(format!("{GROQ_API_KEY_VAR} environment variable not set"))
        })?;

        let runtime = RuntimeConfig::default();
        let config = AnalystConfig {
            groq_api_key,
            groq_api_base: self
                .groq_api_base
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GROQ_API_BASE.to_string()),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            tavily_api_key: self.tavily_api_key.filter(|k| !k.trim().is_empty()),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(120)),
            max_iterations: self.max_iterations.unwrap_or(runtime.max_iterations),
            max_tokens: self.max_tokens.unwrap_or(runtime.max_tokens),
            temperature: self.temperature.or(runtime.temperature),
            search_max_results: self.search_max_results.unwrap_or(5),
            history_months: self.history_months.unwrap_or(6),
        };

        config.validate()?;
        Ok(config)
    }
}

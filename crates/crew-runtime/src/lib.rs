//! Stage runtime for stock-crew
//!
//! This crate turns a persona and a tool set into a runnable
//! [`crew_core::Stage`]: [`AgentExecutor`] drives the LLM tool loop,
//! [`StageAgent`] builds the prompts, and [`CrewRuntime`] holds the shared
//! provider and defaults used to create stages.

pub mod executor;
pub mod persona;
pub mod runtime;
pub mod stage;

// Re-export key types
pub use executor::{
    AgentExecutor, ExecutorConfig, ExecutorEventHandler, FINAL_ANSWER_PROMPT, NoOpEventHandler,
};
pub use persona::Persona;
pub use runtime::{CrewRuntime, CrewRuntimeBuilder, DEFAULT_MODEL, RuntimeConfig};
pub use stage::StageAgent;

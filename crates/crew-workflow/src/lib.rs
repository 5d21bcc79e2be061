//! Sequential stage orchestration for stock-crew
//!
//! A [`Crew`] runs its [`Task`]s strictly in declaration order. Each task
//! renders its description against the kickoff [`crew_core::Context`], may
//! take the verbatim outputs of earlier tasks as context, and hands the
//! result to its stage. The last task's output is the crew's result.

pub mod crew;
pub mod task;

// Re-export for convenience
pub use crew::{Crew, CrewBuilder, CrewObserver, CrewOutput, NoOpObserver, TaskOutput};
pub use task::Task;

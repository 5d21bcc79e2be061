//! Tool management and execution framework for stock-crew
//!
//! Tools are the actions a stage may take while reasoning: each one has a
//! stable name, a description for the model, one named string argument, and
//! a string result. Failures never escape a tool call; they come back to the
//! model as text starting with `Error: `.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgument, ToolError};

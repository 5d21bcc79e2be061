//! Stage trait definition

use crate::Result;
use async_trait::async_trait;

/// Everything a stage needs to produce its answer
///
/// The instruction is already rendered (template variables substituted).
/// `context` holds the verbatim outputs of earlier stages this one depends
/// on, joined in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// What the stage should do
    pub instruction: String,
    /// Description of the shape of the answer
    pub expected_output: String,
    /// Output of prior stages, if any
    pub context: Option<String>,
}

impl Assignment {
    /// Create an assignment without prior context
    pub fn new(instruction: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            expected_output: expected_output.into(),
            context: None,
        }
    }

    /// Attach the output of earlier stages
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// One configured step of a sequential pipeline
///
/// A stage is a function of (instruction, optional prior output, tool set)
/// to text. Implementations decide how the text is produced; the pipeline
/// only sequences them.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Role of the stage (e.g. "Financial Market Analyst")
    fn role(&self) -> &str;

    /// Produce the stage's answer for an assignment
    async fn perform(&self, assignment: Assignment) -> Result<String>;
}

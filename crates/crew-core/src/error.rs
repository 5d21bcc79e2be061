//! Error types for crew-core

use thiserror::Error;

/// Result type alias for crew-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for stage and pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// A stage or pipeline could not be assembled
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// A stage produced an error while working on its assignment
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed {
        /// Role of the failing stage
        stage: String,
        /// Underlying cause
        reason: String,
    },

    /// The language model call behind a stage failed
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// A task description could not be rendered from the kickoff inputs
    #[error("Template error: {0}")]
    Template(String),

    /// The pipeline was driven through a transition it does not allow
    #[error("Invalid pipeline transition: {from} -> {to}")]
    InvalidTransition {
        /// State the pipeline was in
        from: String,
        /// State that was requested
        to: String,
    },
}

impl Error {
    /// Wrap any displayable cause as a failure of the named stage
    pub fn stage(stage: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_display() {
        let err = Error::stage("Strategic Stock Trader", "timeout");
        assert_eq!(
            err.to_string(),
            "Stage 'Strategic Stock Trader' failed: timeout"
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = Error::InvalidTransition {
            from: "Idle".to_string(),
            to: "Done".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid pipeline transition: Idle -> Done");
    }
}

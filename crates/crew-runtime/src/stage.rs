//! Stage implementation backed by the LLM tool loop

use crate::{AgentExecutor, Persona};
use async_trait::async_trait;
use crew_core::{Assignment, Error, Result, Stage};
use tracing::{info, instrument};

/// A stage that answers its assignment by running an [`AgentExecutor`]
pub struct StageAgent {
    persona: Persona,
    executor: AgentExecutor,
}

impl StageAgent {
    /// Create a new stage
    pub fn new(persona: Persona, executor: AgentExecutor) -> Self {
        Self { persona, executor }
    }

    /// The stage's persona
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// The underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

/// User prompt for one assignment
pub fn render_user_prompt(assignment: &Assignment) -> String {
    let mut prompt = format!(
        "{}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        assignment.instruction, assignment.expected_output
    );

    if let Some(context) = assignment.context.as_deref().filter(|c| !c.is_empty()) {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        prompt.push_str(context);
    }

    prompt
}

#[async_trait]
impl Stage for StageAgent {
    fn role(&self) -> &str {
        &self.persona.role
    }

    #[instrument(skip(self, assignment), fields(role = %self.persona.role))]
    async fn perform(&self, assignment: Assignment) -> Result<String> {
        info!(
            has_context = assignment.context.is_some(),
            tools = self.executor.tools().len(),
            "Stage started"
        );

        let answer = self
            .executor
            .run(&self.persona.system_prompt(), render_user_prompt(&assignment))
            .await
            .map_err(|e| Error::stage(&self.persona.role, e))?;

        info!(answer_length = answer.len(), "Stage finished");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExecutorConfig;
    use crew_llm::LLMError;
    use crew_llm::scripted::ScriptedProvider;
    use crew_tools::ToolRegistry;
    use std::sync::Arc;

    fn trader() -> Persona {
        Persona::new(
            "Strategic Stock Trader",
            "Decide Buy/Sell/Hold based on analysis.",
            "Experienced trader.",
        )
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = render_user_prompt(&Assignment::new(
            "Analyze the performance of TSLA.",
            "Bullet point summary of performance.",
        ));
        assert!(prompt.starts_with("Analyze the performance of TSLA."));
        assert!(prompt.contains(
            "This is the expected criteria for your final answer: Bullet point summary of performance."
        ));
        assert!(!prompt.contains("This is the context you're working with"));
    }

    #[test]
    fn test_prompt_with_context() {
        let prompt = render_user_prompt(
            &Assignment::new("Decide.", "Recommendation").with_context("- up 3% on earnings"),
        );
        assert!(prompt.ends_with("This is the context you're working with:\n- up 3% on earnings"));
    }

    #[tokio::test]
    async fn test_perform_uses_persona_prompt() {
        let provider = Arc::new(ScriptedProvider::new().with_text("Hold: mixed signals"));
        let executor =
            AgentExecutor::new(provider.clone(), ToolRegistry::new(), ExecutorConfig::default());
        let stage = StageAgent::new(trader(), executor);

        let out = stage
            .perform(Assignment::new("Decide on TSLA.", "Recommendation").with_context("- flat"))
            .await
            .unwrap();
        assert_eq!(out, "Hold: mixed signals");
        assert_eq!(stage.role(), "Strategic Stock Trader");

        let request = &provider.requests()[0];
        assert!(
            request
                .system
                .as_deref()
                .unwrap()
                .starts_with("You are Strategic Stock Trader.")
        );
        assert!(request.tools.is_empty());
        assert!(request.last_user_text().unwrap().contains("- flat"));
    }

    #[tokio::test]
    async fn test_perform_wraps_errors_with_role() {
        let provider =
            Arc::new(ScriptedProvider::new().with_error(LLMError::AuthenticationFailed));
        let executor = AgentExecutor::new(provider, ToolRegistry::new(), ExecutorConfig::default());
        let stage = StageAgent::new(trader(), executor);

        let err = stage
            .perform(Assignment::new("Decide.", "Recommendation"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StageFailed { ref stage, .. } if stage == "Strategic Stock Trader"));
    }
}

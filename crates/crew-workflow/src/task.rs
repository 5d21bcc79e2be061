//! Task definition

use crew_core::{Context, Error, Result, Stage};
use minijinja::{Environment, UndefinedBehavior};
use std::sync::Arc;

/// One unit of work in a crew
///
/// The description is a MiniJinja template (e.g. `Analyze {{ stock }}.`)
/// rendered against the kickoff inputs when the task runs.
#[derive(Clone)]
pub struct Task {
    name: String,
    description: String,
    expected_output: String,
    stage: Arc<dyn Stage>,
    context_from: Vec<String>,
}

impl Task {
    /// Create a task executed by `stage`
    pub fn new(name: impl Into<String>, stage: Arc<dyn Stage>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            expected_output: String::new(),
            stage,
            context_from: Vec::new(),
        }
    }

    /// Set the description template
    pub fn description(mut self, template: impl Into<String>) -> Self {
        self.description = template.into();
        self
    }

    /// Set the expected output
    pub fn expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = expected.into();
        self
    }

    /// Take the output of an earlier task as context
    pub fn context_from(mut self, task_name: impl Into<String>) -> Self {
        self.context_from.push(task_name.into());
        self
    }

    /// Task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected output description
    pub fn expected(&self) -> &str {
        &self.expected_output
    }

    /// Names of tasks whose output this task reads
    pub fn context_sources(&self) -> &[String] {
        &self.context_from
    }

    /// The stage that runs this task
    pub fn stage(&self) -> &Arc<dyn Stage> {
        &self.stage
    }

    /// Render the description against the kickoff inputs
    ///
    /// Referencing an input that was not provided is an error.
    pub fn render(&self, context: &Context) -> Result<String> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.render_str(&self.description, context.template_vars())
            .map_err(|e| Error::Template(format!("task '{}': {e}", self.name)))
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("role", &self.stage.role())
            .field("context_from", &self.context_from)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crew_core::Assignment;

    struct Idle;

    #[async_trait]
    impl Stage for Idle {
        fn role(&self) -> &str {
            "idle"
        }

        async fn perform(&self, _assignment: Assignment) -> Result<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_render_stock() {
        let task = Task::new("analysis", Arc::new(Idle))
            .description("Analyze the performance of {{ stock }}. Focus on today's price and news.");
        let rendered = task.render(&Context::for_stock("RELIANCE.NS")).unwrap();
        assert_eq!(
            rendered,
            "Analyze the performance of RELIANCE.NS. Focus on today's price and news."
        );
    }

    #[test]
    fn test_render_missing_input_fails() {
        let task = Task::new("analysis", Arc::new(Idle)).description("Analyze {{ stock }}.");
        let err = task.render(&Context::new()).unwrap_err();
        assert!(matches!(err, Error::Template(ref msg) if msg.starts_with("task 'analysis'")));
    }

    #[test]
    fn test_plain_text_renders_unchanged() {
        let task = Task::new("t", Arc::new(Idle)).description("Decide Buy/Sell/Hold.");
        assert_eq!(task.render(&Context::new()).unwrap(), "Decide Buy/Sell/Hold.");
    }
}

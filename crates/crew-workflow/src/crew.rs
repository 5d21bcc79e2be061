//! Crew definition and execution

use crate::Task;
use crew_core::{Assignment, Context, Error, Result};
use std::collections::HashSet;
use tracing::{error, info};

/// Output of one finished task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    /// Task name
    pub name: String,
    /// Role of the stage that produced it
    pub role: String,
    /// Verbatim stage answer
    pub output: String,
}

/// Outputs of a completed crew run, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewOutput {
    /// Per-task outputs
    pub tasks: Vec<TaskOutput>,
}

impl CrewOutput {
    /// Output of the last task, the crew's result
    pub fn raw(&self) -> &str {
        self.tasks.last().map_or("", |t| t.output.as_str())
    }
}

/// Observer of a crew run
///
/// Hooks returning `Err` abort the run with that error.
pub trait CrewObserver: Send + Sync {
    /// Called before task `index` starts
    fn on_task_start(&self, _index: usize, _task: &Task) -> Result<()> {
        Ok(())
    }

    /// Called after task `index` produced its output
    fn on_task_complete(&self, _index: usize, _output: &TaskOutput) -> Result<()> {
        Ok(())
    }

    /// Called once when task `index` fails; the run stops afterwards
    fn on_failure(&self, _index: usize, _error: &Error) {}

    /// Called after the last task completed
    fn on_finish(&self, _output: &CrewOutput) -> Result<()> {
        Ok(())
    }
}

/// Observer that ignores every event
pub struct NoOpObserver;

impl CrewObserver for NoOpObserver {}

/// A fixed sequence of tasks
///
/// # Example
///
/// ```no_run
/// use crew_core::Context;
/// use crew_workflow::{Crew, NoOpObserver, Task};
///
/// # async fn example(analyst: std::sync::Arc<dyn crew_core::Stage>, trader: std::sync::Arc<dyn crew_core::Stage>) -> crew_core::Result<()> {
/// let crew = Crew::builder()
///     .task(Task::new("analysis", analyst).description("Analyze {{ stock }}."))
///     .task(
///         Task::new("recommendation", trader)
///             .description("Recommend on {{ stock }}.")
///             .context_from("analysis"),
///     )
///     .build()?;
///
/// let output = crew.kickoff(&Context::for_stock("TSLA"), &NoOpObserver).await?;
/// println!("{}", output.raw());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Crew {
    tasks: Vec<Task>,
}

impl Crew {
    /// Create a new crew builder
    pub fn builder() -> CrewBuilder {
        CrewBuilder::default()
    }

    /// Tasks in execution order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Run every task in order
    ///
    /// The first failure stops the run; no partial output is returned.
    pub async fn kickoff(&self, context: &Context, observer: &dyn CrewObserver) -> Result<CrewOutput> {
        let mut finished: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        for (index, task) in self.tasks.iter().enumerate() {
            match self.run_task(index, task, context, &finished, observer).await {
                Ok(output) => finished.push(output),
                Err(e) => {
                    error!(task = task.name(), "Task failed: {e}");
                    observer.on_failure(index, &e);
                    return Err(e);
                }
            }
        }

        let output = CrewOutput { tasks: finished };
        observer.on_finish(&output)?;
        Ok(output)
    }

    async fn run_task(
        &self,
        index: usize,
        task: &Task,
        context: &Context,
        finished: &[TaskOutput],
        observer: &dyn CrewObserver,
    ) -> Result<TaskOutput> {
        observer.on_task_start(index, task)?;
        info!(
            task = task.name(),
            role = task.stage().role(),
            index = index,
            "Task started"
        );

        let mut assignment = Assignment::new(task.render(context)?, task.expected());

        let prior: Vec<&str> = task
            .context_sources()
            .iter()
            .filter_map(|source| finished.iter().find(|t| &t.name == source))
            .map(|t| t.output.as_str())
            .collect();
        if !prior.is_empty() {
            assignment = assignment.with_context(prior.join("\n\n"));
        }

        let output = TaskOutput {
            name: task.name().to_string(),
            role: task.stage().role().to_string(),
            output: task.stage().perform(assignment).await?,
        };

        info!(task = task.name(), output_length = output.output.len(), "Task completed");
        observer.on_task_complete(index, &output)?;
        Ok(output)
    }
}

/// Builder for constructing crews
#[derive(Default)]
pub struct CrewBuilder {
    tasks: Vec<Task>,
}

impl CrewBuilder {
    /// Append a task
    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Build the crew
    ///
    /// Fails when there are no tasks, when two tasks share a name, or when a
    /// task takes context from a task that is not declared before it.
    pub fn build(self) -> Result<Crew> {
        if self.tasks.is_empty() {
            return Err(Error::InitializationFailed(
                "a crew needs at least one task".to_string(),
            ));
        }

        let mut declared: HashSet<&str> = HashSet::new();
        for task in &self.tasks {
            for source in task.context_sources() {
                if !declared.contains(source.as_str()) {
                    return Err(Error::InitializationFailed(format!(
                        "task '{}' takes context from '{source}', which is not declared before it",
                        task.name()
                    )));
                }
            }
            if !declared.insert(task.name()) {
                return Err(Error::InitializationFailed(format!(
                    "duplicate task name '{}'",
                    task.name()
                )));
            }
        }

        Ok(Crew { tasks: self.tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crew_core::Stage;
    use std::sync::{Arc, Mutex};

    /// Records every assignment and answers with a fixed reply
    struct Recording {
        role: &'static str,
        reply: std::result::Result<&'static str, &'static str>,
        seen: Mutex<Vec<Assignment>>,
    }

    impl Recording {
        fn ok(role: &'static str, reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                role,
                reply: Ok(reply),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(role: &'static str, reason: &'static str) -> Arc<Self> {
            Arc::new(Self {
                role,
                reply: Err(reason),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Stage for Recording {
        fn role(&self) -> &str {
            self.role
        }

        async fn perform(&self, assignment: Assignment) -> Result<String> {
            self.seen.lock().unwrap().push(assignment);
            self.reply
                .map(str::to_string)
                .map_err(|reason| Error::stage(self.role, reason))
        }
    }

    #[derive(Default)]
    struct Log(Mutex<Vec<String>>);

    impl CrewObserver for Log {
        fn on_task_start(&self, index: usize, task: &Task) -> Result<()> {
            self.0.lock().unwrap().push(format!("start {index} {}", task.name()));
            Ok(())
        }

        fn on_task_complete(&self, index: usize, _output: &TaskOutput) -> Result<()> {
            self.0.lock().unwrap().push(format!("complete {index}"));
            Ok(())
        }

        fn on_failure(&self, index: usize, _error: &Error) {
            self.0.lock().unwrap().push(format!("failure {index}"));
        }

        fn on_finish(&self, _output: &CrewOutput) -> Result<()> {
            self.0.lock().unwrap().push("finish".to_string());
            Ok(())
        }
    }

    fn two_task_crew(first: Arc<Recording>, second: Arc<Recording>) -> Crew {
        Crew::builder()
            .task(
                Task::new("analysis", first)
                    .description("Analyze the performance of {{ stock }}.")
                    .expected_output("Bullet point summary of performance."),
            )
            .task(
                Task::new("recommendation", second)
                    .description("Based on analysis of {{ stock }}, recommend.")
                    .expected_output("Trading recommendation with reasons.")
                    .context_from("analysis"),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_context_flows_verbatim() {
        let analyst = Recording::ok("Financial Market Analyst", "- up 2%\n- beat estimates");
        let trader = Recording::ok("Strategic Stock Trader", "Buy");
        let crew = two_task_crew(analyst.clone(), trader.clone());

        let log = Log::default();
        let output = crew.kickoff(&Context::for_stock("TSLA"), &log).await.unwrap();

        assert_eq!(output.raw(), "Buy");
        assert_eq!(output.tasks.len(), 2);
        assert_eq!(output.tasks[0].role, "Financial Market Analyst");

        let first = analyst.seen.lock().unwrap()[0].clone();
        assert_eq!(first.instruction, "Analyze the performance of TSLA.");
        assert!(first.context.is_none());

        let second = trader.seen.lock().unwrap()[0].clone();
        assert_eq!(second.instruction, "Based on analysis of TSLA, recommend.");
        assert_eq!(second.context.as_deref(), Some("- up 2%\n- beat estimates"));

        assert_eq!(
            *log.0.lock().unwrap(),
            vec![
                "start 0 analysis",
                "complete 0",
                "start 1 recommendation",
                "complete 1",
                "finish"
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_stops_run() {
        let analyst = Recording::failing("Financial Market Analyst", "rate limited");
        let trader = Recording::ok("Strategic Stock Trader", "Buy");
        let crew = two_task_crew(analyst, trader.clone());

        let log = Log::default();
        let err = crew
            .kickoff(&Context::for_stock("TSLA"), &log)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::StageFailed { .. }));
        assert!(trader.seen.lock().unwrap().is_empty());
        assert_eq!(*log.0.lock().unwrap(), vec!["start 0 analysis", "failure 0"]);
    }

    #[tokio::test]
    async fn test_template_error_reported_as_failure() {
        let analyst = Recording::ok("a", "x");
        let crew = Crew::builder()
            .task(Task::new("analysis", analyst.clone()).description("{{ ticker }}"))
            .build()
            .unwrap();

        let log = Log::default();
        let err = crew.kickoff(&Context::for_stock("TSLA"), &log).await.unwrap_err();
        assert!(matches!(err, Error::Template(_)));
        assert!(analyst.seen.lock().unwrap().is_empty());
        assert_eq!(log.0.lock().unwrap().last().map(String::as_str), Some("failure 0"));
    }

    #[test]
    fn test_forward_context_rejected() {
        let stage = Recording::ok("r", "x");
        let result = Crew::builder()
            .task(Task::new("recommendation", stage.clone()).context_from("analysis"))
            .task(Task::new("analysis", stage))
            .build();
        assert!(
            matches!(result, Err(Error::InitializationFailed(ref msg)) if msg.contains("not declared before it"))
        );
    }

    #[test]
    fn test_self_context_rejected() {
        let stage = Recording::ok("r", "x");
        let result = Crew::builder()
            .task(Task::new("analysis", stage).context_from("analysis"))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_and_empty_rejected() {
        assert!(Crew::builder().build().is_err());

        let stage = Recording::ok("r", "x");
        let result = Crew::builder()
            .task(Task::new("a", stage.clone()))
            .task(Task::new("a", stage))
            .build();
        assert!(matches!(result, Err(Error::InitializationFailed(ref msg)) if msg.contains("duplicate")));
    }
}

//! Analyst to trader recommendation pipeline
//!
//! Two stages run strictly in order. The analyst has the price and search
//! tools and summarizes the ticker's performance; the trader gets that
//! summary verbatim as context and answers with Buy, Sell or Hold. The
//! trader's answer is the result of the run.
//!
//! Progress is tracked by [`PipelineTracker`], a [`CrewObserver`] that
//! walks a small state machine and rejects transitions it does not allow.

use crate::api::{MarketDataSource, SearchProvider};
use crate::error::Result;
use crate::tools::{StockPriceTool, WebSearchTool};
use crew_core::{Context, Error};
use crew_runtime::{CrewRuntime, Persona};
use crew_tools::ToolRegistry;
use crew_workflow::{Crew, CrewObserver, CrewOutput, Task};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, instrument, warn};

/// Name of the analyst's task
pub const ANALYSIS_TASK: &str = "analysis";
/// Name of the trader's task
pub const RECOMMENDATION_TASK: &str = "recommendation";

const ANALYSIS_DESCRIPTION: &str =
    "Analyze the performance of {{ stock }}. Focus on today's price and news.";
const ANALYSIS_EXPECTED: &str = "Bullet point summary of performance.";
const RECOMMENDATION_DESCRIPTION: &str =
    "Based on analysis of {{ stock }}, give a Buy/Sell/Hold recommendation.";
const RECOMMENDATION_EXPECTED: &str = "Trading recommendation with reasons.";

/// Persona of the first stage
pub fn analyst_persona() -> Persona {
    Persona::new(
        "Financial Market Analyst",
        "Analyze stock performance using real-time data.",
        "Expert financial analyst.",
    )
}

/// Persona of the second stage
pub fn trader_persona() -> Persona {
    Persona::new(
        "Strategic Stock Trader",
        "Decide Buy/Sell/Hold based on analysis.",
        "Experienced trader.",
    )
}

/// Where a pipeline run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    AnalystRunning,
    TraderRunning,
    Done,
    Error,
}

impl PipelineState {
    /// Whether `next` may follow this state
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::{AnalystRunning, Done, Error, Idle, TraderRunning};
        matches!(
            (self, next),
            (Idle, AnalystRunning)
                | (AnalystRunning, TraderRunning)
                | (TraderRunning, Done)
                | (AnalystRunning | TraderRunning, Error)
        )
    }

    /// State entered when task `index` starts
    fn for_task(index: usize) -> Option<PipelineState> {
        match index {
            0 => Some(PipelineState::AnalystRunning),
            1 => Some(PipelineState::TraderRunning),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::AnalystRunning => "analyst running",
            PipelineState::TraderRunning => "trader running",
            PipelineState::Done => "done",
            PipelineState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Receives every state the pipeline enters
pub trait PipelineProgress: Send + Sync {
    fn on_state(&self, state: PipelineState);
}

/// Progress sink that drops every update
pub struct NoProgress;

impl PipelineProgress for NoProgress {
    fn on_state(&self, _state: PipelineState) {}
}

/// State machine driven by crew events
pub struct PipelineTracker<'a> {
    history: Mutex<Vec<PipelineState>>,
    progress: &'a dyn PipelineProgress,
}

impl<'a> PipelineTracker<'a> {
    /// Fresh tracker in the `Idle` state
    pub fn new(progress: &'a dyn PipelineProgress) -> Self {
        Self {
            history: Mutex::new(vec![PipelineState::Idle]),
            progress,
        }
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
            .unwrap_or(PipelineState::Idle)
    }

    /// Every state entered so far, starting with `Idle`
    pub fn history(&self) -> Vec<PipelineState> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Move to `next`, or fail when the move is not allowed
    pub fn transition(&self, next: PipelineState) -> crew_core::Result<()> {
        {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            let current = history.last().copied().unwrap_or(PipelineState::Idle);
            if !current.can_transition_to(next) {
                return Err(Error::InvalidTransition {
                    from: current.to_string(),
                    to: next.to_string(),
                });
            }
            history.push(next);
        }

        self.progress.on_state(next);
        Ok(())
    }
}

impl CrewObserver for PipelineTracker<'_> {
    fn on_task_start(&self, index: usize, task: &Task) -> crew_core::Result<()> {
        let next = PipelineState::for_task(index).ok_or_else(|| Error::InvalidTransition {
            from: self.state().to_string(),
            to: format!("task '{}'", task.name()),
        })?;
        self.transition(next)
    }

    fn on_failure(&self, _index: usize, error: &Error) {
        if let Err(e) = self.transition(PipelineState::Error) {
            warn!("Could not record pipeline failure ({error}): {e}");
        }
    }

    fn on_finish(&self, _output: &CrewOutput) -> crew_core::Result<()> {
        self.transition(PipelineState::Done)
    }
}

/// The two-stage recommendation crew
pub struct RecommendationPipeline {
    crew: Crew,
}

impl RecommendationPipeline {
    /// Build the stages on `runtime`
    ///
    /// The analyst gets the price and search tools; the trader gets none.
    pub fn new(
        runtime: &CrewRuntime,
        market_data: Arc<dyn MarketDataSource>,
        search: Arc<dyn SearchProvider>,
    ) -> Result<Self> {
        let analyst_tools = ToolRegistry::new()
            .with(Arc::new(StockPriceTool::new(market_data)))
            .with(Arc::new(WebSearchTool::new(search)));

        let analyst = Arc::new(runtime.stage(analyst_persona(), analyst_tools));
        let trader = Arc::new(runtime.stage(trader_persona(), ToolRegistry::new()));

        let crew = Crew::builder()
            .task(
                Task::new(ANALYSIS_TASK, analyst)
                    .description(ANALYSIS_DESCRIPTION)
                    .expected_output(ANALYSIS_EXPECTED),
            )
            .task(
                Task::new(RECOMMENDATION_TASK, trader)
                    .description(RECOMMENDATION_DESCRIPTION)
                    .expected_output(RECOMMENDATION_EXPECTED)
                    .context_from(ANALYSIS_TASK),
            )
            .build()?;

        Ok(Self { crew })
    }

    /// Run both stages for `ticker` and return the trader's answer verbatim
    #[instrument(skip(self, progress))]
    pub async fn run(&self, ticker: &str, progress: &dyn PipelineProgress) -> Result<String> {
        let tracker = PipelineTracker::new(progress);
        let output = self
            .crew
            .kickoff(&Context::for_stock(ticker), &tracker)
            .await?;

        info!(tasks = output.tasks.len(), "Recommendation ready");
        Ok(output.raw().to_string())
    }
}

//! One dashboard run: resolve, fetch, show, recommend
//!
//! [`Dashboard::run`] is the single outer catch for a run. Data-not-found is
//! reported as such and stops before any LLM call; every other failure is
//! shown once as `An error occurred: ...`.

pub mod console;

pub use console::{ConsoleView, ToolActivity};

use crate::api::{MarketDataSource, SearchProvider, TavilyClient, YahooFinanceClient};
use crate::chart::chart_title;
use crate::config::AnalystConfig;
use crate::data::PriceSeries;
use crate::error::Result;
use crate::market::Market;
use crate::metrics::SummaryMetrics;
use crate::pipeline::{PipelineProgress, PipelineState, RecommendationPipeline};
use crew_llm::LLMProvider;
use crew_runtime::{CrewRuntime, ExecutorEventHandler};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

/// Shown when the ticker is unknown or has no history
pub const NOT_FOUND_MESSAGE: &str = "Invalid Stock Symbol or No Data Found!";

/// Presentation surface for a run
pub trait DashboardView: Send + Sync {
    /// Market data is being fetched
    fn fetching(&self, ticker: &str);

    /// Nothing to show for this ticker
    fn not_found(&self, ticker: &str, message: &str);

    /// Summary metrics row
    fn metrics(&self, metrics: &SummaryMetrics);

    /// Closing-price chart
    fn chart(&self, title: &str, series: &PriceSeries);

    /// Pipeline progress
    fn stage(&self, state: PipelineState);

    /// Final trader answer
    fn recommendation(&self, text: &str);

    /// Run-level failure
    fn error(&self, message: &str);
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The symbol could not be resolved
    InvalidInput,
    /// Unknown ticker or empty history
    NotFound,
    /// Recommendation produced
    Completed(String),
    /// Any other failure, with the message shown
    Failed(String),
}

struct ViewProgress<'a>(&'a dyn DashboardView);

impl PipelineProgress for ViewProgress<'_> {
    fn on_state(&self, state: PipelineState) {
        self.0.stage(state);
    }
}

/// The dashboard behind every presentation
pub struct Dashboard {
    market_data: Arc<dyn MarketDataSource>,
    pipeline: RecommendationPipeline,
    history_months: u32,
}

impl Dashboard {
    pub fn new(
        market_data: Arc<dyn MarketDataSource>,
        pipeline: RecommendationPipeline,
        history_months: u32,
    ) -> Self {
        Self {
            market_data,
            pipeline,
            history_months,
        }
    }

    /// Wire the Yahoo and Tavily clients and the crew runtime from config
    ///
    /// `tool_events` observes every tool call the analyst makes.
    pub fn from_config(
        config: &AnalystConfig,
        provider: Arc<dyn LLMProvider>,
        tool_events: Arc<dyn ExecutorEventHandler>,
    ) -> Result<Self> {
        let market_data: Arc<dyn MarketDataSource> = Arc::new(YahooFinanceClient::new(
            config.request_timeout,
            config.history_months,
        )?);
        let search: Arc<dyn SearchProvider> = Arc::new(TavilyClient::new(
            config.tavily_api_key.clone(),
            config.search_max_results,
            config.request_timeout,
        )?);

        let runtime = CrewRuntime::builder()
            .provider(provider)
            .config(config.runtime_config())
            .event_handler(tool_events)
            .build()?;
        let pipeline = RecommendationPipeline::new(&runtime, market_data.clone(), search)?;

        Ok(Self::new(market_data, pipeline, config.history_months))
    }

    /// Run the dashboard once for `symbol` on `market`
    pub async fn run(&self, market: Market, symbol: &str, view: &dyn DashboardView) -> RunOutcome {
        let ticker = match market.resolve_ticker(symbol) {
            Ok(ticker) => ticker,
            Err(e) => {
                view.error(&e.to_string());
                return RunOutcome::InvalidInput;
            }
        };

        let run_id = Uuid::new_v4();
        let span = info_span!("dashboard_run", %run_id, ticker = %ticker, market = market.key());

        async {
            match self.run_ticker(&ticker, view).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Run failed: {e}");
                    let message = format!("An error occurred: {e}");
                    view.error(&message);
                    RunOutcome::Failed(message)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_ticker(&self, ticker: &str, view: &dyn DashboardView) -> Result<RunOutcome> {
        view.fetching(ticker);

        let data = match self.market_data.fetch(ticker).await {
            Ok(data) => data,
            Err(e) if e.is_not_found() => {
                info!("Ticker not found: {e}");
                view.not_found(ticker, NOT_FOUND_MESSAGE);
                return Ok(RunOutcome::NotFound);
            }
            Err(e) => return Err(e),
        };

        if !data.has_history() {
            info!("No history in window");
            view.not_found(
                ticker,
                &format!(
                    "{NOT_FOUND_MESSAGE} {ticker} has no quotes in the last {} months.",
                    self.history_months
                ),
            );
            return Ok(RunOutcome::NotFound);
        }

        match SummaryMetrics::from_quote(&data.quote) {
            Some(metrics) => view.metrics(&metrics),
            None => debug!("Snapshot lacks price or previous close, metrics skipped"),
        }

        view.chart(&chart_title(ticker, self.history_months), &data.series);

        let recommendation = self
            .pipeline
            .run(ticker, &ViewProgress(view))
            .await?;

        view.recommendation(&recommendation);
        Ok(RunOutcome::Completed(recommendation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockMarketDataSource, MockSearchProvider};
    use crate::data::{MarketData, PriceBar, QuoteSnapshot};
    use crate::error::StockError;
    use chrono::{TimeZone, Utc};
    use crew_llm::scripted::ScriptedProvider;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingView(Mutex<Vec<String>>);

    impl RecordingView {
        fn push(&self, event: String) {
            self.0.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl DashboardView for RecordingView {
        fn fetching(&self, ticker: &str) {
            self.push(format!("fetching {ticker}"));
        }
        fn not_found(&self, _ticker: &str, message: &str) {
            self.push(format!("not_found {message}"));
        }
        fn metrics(&self, metrics: &SummaryMetrics) {
            self.push(format!("metrics {}", metrics.price_label()));
        }
        fn chart(&self, title: &str, series: &PriceSeries) {
            self.push(format!("chart {title} ({} bars)", series.len()));
        }
        fn stage(&self, state: PipelineState) {
            self.push(format!("stage {state}"));
        }
        fn recommendation(&self, text: &str) {
            self.push(format!("recommendation {text}"));
        }
        fn error(&self, message: &str) {
            self.push(format!("error {message}"));
        }
    }

    fn history(ticker: &str) -> PriceSeries {
        let bars = (1..=3)
            .map(|day| PriceBar {
                timestamp: Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap(),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + f64::from(day),
                volume: 1000,
                adjclose: 100.0 + f64::from(day),
            })
            .collect();
        PriceSeries::new(ticker, bars)
    }

    fn dashboard(source: MockMarketDataSource, provider: Arc<ScriptedProvider>) -> Dashboard {
        let runtime = CrewRuntime::builder().provider(provider).build().unwrap();
        let pipeline = RecommendationPipeline::new(
            &runtime,
            Arc::new(MockMarketDataSource::new()),
            Arc::new(MockSearchProvider::new()),
        )
        .unwrap();
        Dashboard::new(Arc::new(source), pipeline, 6)
    }

    #[tokio::test]
    async fn test_full_run() {
        let mut source = MockMarketDataSource::new();
        source.expect_fetch().times(1).returning(|ticker| {
            assert_eq!(ticker, "RELIANCE.NS");
            Ok(MarketData {
                series: history(ticker),
                quote: QuoteSnapshot::default()
                    .with("currentPrice", 2950.0)
                    .with("previousClose", 2900.0)
                    .with("currency", "INR"),
            })
        });
        let provider = Arc::new(ScriptedProvider::new().with_text("- steady").with_text("Hold"));
        let view = RecordingView::default();

        let outcome = dashboard(source, provider)
            .run(Market::IndiaNse, "reliance", &view)
            .await;

        assert_eq!(outcome, RunOutcome::Completed("Hold".to_string()));
        assert_eq!(
            view.events(),
            vec![
                "fetching RELIANCE.NS",
                "metrics 2950.0 INR",
                "chart RELIANCE.NS - 6 Month Performance (3 bars)",
                "stage analyst running",
                "stage trader running",
                "stage done",
                "recommendation Hold",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_history_stops_before_llm() {
        let mut source = MockMarketDataSource::new();
        source.expect_fetch().returning(|ticker| {
            Ok(MarketData {
                series: PriceSeries::empty(ticker),
                quote: QuoteSnapshot::default().with("currentPrice", 10.0),
            })
        });
        let provider = Arc::new(ScriptedProvider::new());
        let view = RecordingView::default();

        let outcome = dashboard(source, provider.clone()).run(Market::Usa, "tsla", &view).await;

        assert_eq!(outcome, RunOutcome::NotFound);
        assert!(provider.requests().is_empty());
        let events = view.events();
        assert_eq!(events.len(), 2);
        assert!(events[1].starts_with("not_found Invalid Stock Symbol or No Data Found!"));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_found() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch()
            .returning(|ticker| Err(StockError::InvalidSymbol(ticker.to_string())));
        let provider = Arc::new(ScriptedProvider::new());
        let view = RecordingView::default();

        let outcome = dashboard(source, provider.clone()).run(Market::Usa, "NOPE", &view).await;

        assert_eq!(outcome, RunOutcome::NotFound);
        assert_eq!(
            view.events()[1],
            "not_found Invalid Stock Symbol or No Data Found!"
        );
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_price_skips_metrics_only() {
        let mut source = MockMarketDataSource::new();
        source.expect_fetch().returning(|ticker| {
            Ok(MarketData {
                series: history(ticker),
                quote: QuoteSnapshot::default().with("previousClose", 99.0),
            })
        });
        let provider = Arc::new(ScriptedProvider::new().with_text("- flat").with_text("Hold"));
        let view = RecordingView::default();

        let outcome = dashboard(source, provider).run(Market::Usa, "TSLA", &view).await;

        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert!(!view.events().iter().any(|e| e.starts_with("metrics")));
        assert!(view.events().iter().any(|e| e.starts_with("chart TSLA")));
    }

    #[tokio::test]
    async fn test_data_failure_is_reported_once() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch()
            .returning(|_| Err(StockError::ApiError("HTTP 503 for TSLA".to_string())));
        let view = RecordingView::default();

        let outcome = dashboard(source, Arc::new(ScriptedProvider::new()))
            .run(Market::Usa, "TSLA", &view)
            .await;

        assert_eq!(
            outcome,
            RunOutcome::Failed("An error occurred: API error: HTTP 503 for TSLA".to_string())
        );
        assert_eq!(
            view.events().last().unwrap(),
            "error An error occurred: API error: HTTP 503 for TSLA"
        );
    }

    #[tokio::test]
    async fn test_broken_history_is_an_error_not_a_missing_ticker() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch()
            .returning(|_| Err(StockError::YahooFinanceError("Data inconsistency".to_string())));
        let view = RecordingView::default();

        let outcome = dashboard(source, Arc::new(ScriptedProvider::new()))
            .run(Market::Usa, "AAPL", &view)
            .await;

        assert_eq!(
            outcome,
            RunOutcome::Failed(
                "An error occurred: Yahoo Finance error: Data inconsistency".to_string()
            )
        );
        assert!(!view.events().iter().any(|e| e.starts_with("not_found")));
    }

    #[tokio::test]
    async fn test_pipeline_failure_discards_partial_output() {
        let mut source = MockMarketDataSource::new();
        source.expect_fetch().returning(|ticker| {
            Ok(MarketData {
                series: history(ticker),
                quote: QuoteSnapshot::default(),
            })
        });
        let provider = Arc::new(ScriptedProvider::new().with_text("- analysis only"));
        let view = RecordingView::default();

        let outcome = dashboard(source, provider).run(Market::Usa, "TSLA", &view).await;

        assert!(
            matches!(outcome, RunOutcome::Failed(ref msg) if msg.starts_with("An error occurred: "))
        );
        let events = view.events();
        assert!(events.contains(&"stage error".to_string()));
        assert!(!events.iter().any(|e| e.starts_with("recommendation")));
    }

    #[tokio::test]
    async fn test_empty_symbol_is_invalid_input() {
        let view = RecordingView::default();
        let outcome = dashboard(MockMarketDataSource::new(), Arc::new(ScriptedProvider::new()))
            .run(Market::Usa, "  ", &view)
            .await;
        assert_eq!(outcome, RunOutcome::InvalidInput);
    }
}

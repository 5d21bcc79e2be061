//! AI stock analyst dashboard
//!
//! Resolves a ticker against a [`Market`], fetches six months of history and
//! a quote snapshot, shows the headline metrics and a closing-price chart,
//! then runs a two-stage LLM pipeline (analyst, then trader) that ends in a
//! Buy/Sell/Hold recommendation.
//!
//! # Modules
//!
//! - [`api`]: Yahoo Finance and Tavily clients behind the
//!   [`api::MarketDataSource`] and [`api::SearchProvider`] traits
//! - [`tools`]: the price and search tools given to the analyst
//! - [`pipeline`]: the analyst to trader crew and its state machine
//! - [`dashboard`]: one run end to end, plus the terminal view
//!
//! # Example
//!
//! ```no_run
//! use crew_llm::providers::GroqProvider;
//! use stock_analyst::{AnalystConfig, ConsoleView, Dashboard, Market, ToolActivity};
//! use std::sync::Arc;
//!
//! # async fn example() -> stock_analyst::Result<()> {
//! let config = AnalystConfig::from_env()?;
//! let provider = Arc::new(GroqProvider::with_config(config.groq_config())?);
//! let dashboard = Dashboard::from_config(&config, provider, Arc::new(ToolActivity))?;
//!
//! dashboard.run(Market::IndiaNse, "RELIANCE", &ConsoleView::default()).await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod market;
pub mod metrics;
pub mod pipeline;
pub mod tools;

pub use config::AnalystConfig;
pub use dashboard::{ConsoleView, Dashboard, DashboardView, RunOutcome, ToolActivity};
pub use data::{MarketData, PriceBar, PriceSeries, QuoteSnapshot};
pub use error::{Result, StockError};
pub use market::Market;
pub use metrics::SummaryMetrics;
pub use pipeline::{PipelineState, RecommendationPipeline};

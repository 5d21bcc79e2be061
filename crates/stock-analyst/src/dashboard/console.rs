//! Terminal rendering of a dashboard run

use super::DashboardView;
use crate::chart::LineChart;
use crate::data::PriceSeries;
use crate::market::Market;
use crate::metrics::SummaryMetrics;
use crate::pipeline::PipelineState;
use async_trait::async_trait;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use crew_runtime::ExecutorEventHandler;
use serde_json::Value;

/// Heading of the result block
pub const RECOMMENDATION_HEADING: &str = "Strategic Recommendation";

/// Metrics row as a table
pub fn metrics_table(metrics: &SummaryMetrics) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Current Price", "Change", "Volume"])
        .add_row(vec![
            metrics.price_label(),
            format!("{} ({})", metrics.change_label(), metrics.change_pct_label()),
            metrics.volume_label(),
        ]);
    table
}

/// Every supported market with its key, suffix and example ticker
pub fn markets_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Key", "Market", "Suffix", "Example"]);
    for market in Market::ALL {
        let suffix = if market.suffix().is_empty() {
            "(none)"
        } else {
            market.suffix()
        };
        table.add_row(vec![market.key(), market.label(), suffix, market.example()]);
    }
    table
}

/// Result block with its heading
pub fn recommendation_block(text: &str) -> String {
    let rule = "=".repeat(RECOMMENDATION_HEADING.len());
    format!("{RECOMMENDATION_HEADING}\n{rule}\n{}", text.trim())
}

fn stage_line(state: PipelineState) -> Option<&'static str> {
    match state {
        PipelineState::AnalystRunning => Some("Financial Market Analyst is researching..."),
        PipelineState::TraderRunning => Some("Strategic Stock Trader is deciding..."),
        PipelineState::Idle | PipelineState::Done | PipelineState::Error => None,
    }
}

pub fn tool_start_line(name: &str, input: &Value) -> String {
    format!("  -> {name} {input}")
}

pub fn tool_done_line(name: &str, duration_ms: u64) -> String {
    format!("  <- {name} answered in {duration_ms} ms")
}

/// Prints one line when a tool starts and one when it answers
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolActivity;

#[async_trait]
impl ExecutorEventHandler for ToolActivity {
    async fn on_tool_start(&self, name: &str, input: &Value) {
        println!("{}", tool_start_line(name, input));
    }

    async fn on_tool_done(&self, name: &str, _output: &str, duration_ms: u64) {
        println!("{}", tool_done_line(name, duration_ms));
    }
}

/// View printing to stdout
#[derive(Debug, Default)]
pub struct ConsoleView {
    chart: LineChart,
}

impl ConsoleView {
    pub fn new(chart: LineChart) -> Self {
        Self { chart }
    }
}

impl DashboardView for ConsoleView {
    fn fetching(&self, ticker: &str) {
        println!("Fetching market data for {ticker}...");
    }

    fn not_found(&self, _ticker: &str, message: &str) {
        println!("{message}");
    }

    fn metrics(&self, metrics: &SummaryMetrics) {
        println!("{}", metrics_table(metrics));
    }

    fn chart(&self, title: &str, series: &PriceSeries) {
        println!("\n{}\n", self.chart.render(title, series));
    }

    fn stage(&self, state: PipelineState) {
        if let Some(line) = stage_line(state) {
            println!("{line}");
        }
    }

    fn recommendation(&self, text: &str) {
        println!("\n{}\n", recommendation_block(text));
    }

    fn error(&self, message: &str) {
        eprintln!("{message}");
    }
}

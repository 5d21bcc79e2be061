//! Tool for fetching the latest stock price

use crate::api::MarketDataSource;
use crate::data::format_price;
use async_trait::async_trait;
use crew_tools::{Tool, ToolArgument, ToolError};
use std::sync::Arc;

/// Tool name as the model sees it
pub const STOCK_PRICE_TOOL: &str = "live_stock_information";

/// Tool for the latest price and currency of a ticker
pub struct StockPriceTool {
    source: Arc<dyn MarketDataSource>,
}

impl StockPriceTool {
    /// Create a new stock price tool
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &'static str {
        STOCK_PRICE_TOOL
    }

    fn description(&self) -> &'static str {
        "Retrieves the latest stock price and relevant info."
    }

    fn argument(&self) -> ToolArgument {
        ToolArgument::new(
            "stock_symbol",
            "Full ticker symbol including any market suffix, e.g. TSLA or RELIANCE.NS",
        )
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let symbol = input.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ToolError::InvalidInput(
                "stock_symbol must not be empty".to_string(),
            ));
        }

        let quote = self
            .source
            .quote(&symbol)
            .await
            .map_err(ToolError::failed)?;

        let price = quote
            .market_price()
            .map_or_else(|| "N/A".to_string(), format_price);

        Ok(format!(
            "Stock: {symbol}\nPrice: {price}\nCurrency: {}",
            quote.currency()
        ))
    }
}

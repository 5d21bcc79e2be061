//! Tools exposed to the analyst stage
//!
//! Both tools wrap a client trait object and turn every failure into an
//! `Error: ` string, so the stage's tool loop never sees a hard failure.

pub mod stock_price;
pub mod web_search;

pub use stock_price::StockPriceTool;
pub use web_search::WebSearchTool;

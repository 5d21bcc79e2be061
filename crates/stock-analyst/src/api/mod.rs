//! External data clients
//!
//! The dashboard and tools only see the [`MarketDataSource`] and
//! [`SearchProvider`] traits, so tests can swap the network clients out.

pub mod tavily;
pub mod yahoo;

pub use tavily::{SearchResult, TavilyClient};
pub use yahoo::YahooFinanceClient;

use crate::data::{MarketData, QuoteSnapshot};
use crate::error::Result;
use async_trait::async_trait;

/// Source of price history and quote snapshots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Trailing price history plus the current quote snapshot
    async fn fetch(&self, ticker: &str) -> Result<MarketData>;

    /// Quote snapshot only
    async fn quote(&self, ticker: &str) -> Result<QuoteSnapshot>;
}

/// Web search backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Results for a free-text query, in provider order
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

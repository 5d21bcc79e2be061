//! Market data model
//!
//! A [`MarketData`] bundles what one fetch returns: the trailing price
//! history and the quote snapshot. Both are built per run and dropped when
//! the run ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default currency when the snapshot carries none
pub const DEFAULT_CURRENCY: &str = "USD";

/// One bar of price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// Price history of one ticker, ascending by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series; bars are sorted by timestamp
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    /// Empty series for a ticker
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    /// Ticker this series belongs to
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Bars in ascending time order
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Closing prices in time order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// First bar
    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    /// Latest bar
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Quote snapshot: field name to raw value, any key may be missing
///
/// Lookups treat absent, null, non-numeric and zero values alike as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteSnapshot {
    fields: BTreeMap<String, Value>,
}

impl QuoteSnapshot {
    /// Build from a JSON object; non-object values give an empty snapshot
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self {
                fields: map.into_iter().collect(),
            },
            _ => Self::default(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Raw field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// First key holding a usable (non-zero) number
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key).and_then(Value::as_f64))
            .find(|v| *v != 0.0 && v.is_finite())
    }

    /// First key holding a finite, non-negative number; zero is a real count
    pub fn count(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key).and_then(Value::as_f64))
            .find(|v| *v >= 0.0 && v.is_finite())
    }

    /// First key holding a non-empty string
    pub fn text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
    }

    /// Current price: `currentPrice`, then `regularMarketPrice`
    pub fn current_price(&self) -> Option<f64> {
        self.number(&["currentPrice", "regularMarketPrice"])
    }

    /// Latest price as the stock tool reads it: `regularMarketPrice` first
    pub fn market_price(&self) -> Option<f64> {
        self.number(&["regularMarketPrice", "currentPrice"])
    }

    /// Previous close, with the chart-metadata key as last resort
    pub fn previous_close(&self) -> Option<f64> {
        self.number(&[
            "previousClose",
            "regularMarketPreviousClose",
            "chartPreviousClose",
        ])
    }

    /// Trading volume
    pub fn volume(&self) -> Option<f64> {
        self.count(&["volume", "regularMarketVolume"])
    }

    /// Quote currency, `USD` when missing
    pub fn currency(&self) -> &str {
        self.text(&["currency"]).unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result of one market data fetch
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    pub series: PriceSeries,
    pub quote: QuoteSnapshot,
}

impl MarketData {
    /// Whether there is anything to show for this ticker
    pub fn has_history(&self) -> bool {
        !self.series.is_empty()
    }
}

/// Format a price the way it is shown to users
///
/// Whole numbers keep one decimal place; other values print as-is.
pub fn format_price(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

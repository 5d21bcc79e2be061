//! Summary metrics derived from a quote snapshot

use crate::data::{QuoteSnapshot, format_price};
use serde::Serialize;

/// Label shown when the snapshot carries no volume
pub const VOLUME_UNAVAILABLE: &str = "N/A";

/// Headline numbers for the metrics row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub price: f64,
    pub currency: String,
    pub change: f64,
    pub change_pct: f64,
    pub volume: Option<f64>,
}

impl SummaryMetrics {
    /// Build the metrics, or `None` when the current price or previous
    /// close is missing
    pub fn from_quote(quote: &QuoteSnapshot) -> Option<Self> {
        let price = quote.current_price()?;
        let previous = quote.previous_close()?;
        let change = price - previous;

        Some(Self {
            price,
            currency: quote.currency().to_string(),
            change,
            change_pct: change / previous * 100.0,
            volume: quote.volume(),
        })
    }

    /// `"<price> <currency>"`
    pub fn price_label(&self) -> String {
        format!("{} {}", format_price(self.price), self.currency)
    }

    pub fn change_label(&self) -> String {
        format!("{:.2}", self.change)
    }

    pub fn change_pct_label(&self) -> String {
        format!("{:.2}%", self.change_pct)
    }

    /// Volume as a whole number, or `N/A`
    pub fn volume_label(&self) -> String {
        self.volume.map_or_else(
            || VOLUME_UNAVAILABLE.to_string(),
            |v| (v.round() as u64).to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_from_quote() {
        let quote = QuoteSnapshot::default()
            .with("currentPrice", 250.0)
            .with("previousClose", 240.0)
            .with("volume", 98_765_432)
            .with("currency", "USD");

        let metrics = SummaryMetrics::from_quote(&quote).unwrap();
        assert_eq!(metrics.price_label(), "250.0 USD");
        assert_eq!(metrics.change_label(), "10.00");
        assert_eq!(metrics.change_pct_label(), "4.17%");
        assert_eq!(metrics.volume_label(), "98765432");
    }

    #[test]
    fn test_negative_change() {
        let quote = QuoteSnapshot::default()
            .with("regularMarketPrice", 95.5)
            .with("regularMarketPreviousClose", 100.0);

        let metrics = SummaryMetrics::from_quote(&quote).unwrap();
        assert_eq!(metrics.change_label(), "-4.50");
        assert_eq!(metrics.change_pct_label(), "-4.50%");
        assert_eq!(metrics.volume_label(), "N/A");
    }

    #[test]
    fn test_halted_session_reports_zero_volume() {
        let quote = QuoteSnapshot::default()
            .with("currentPrice", 12.0)
            .with("previousClose", 12.0)
            .with("volume", 0);

        let metrics = SummaryMetrics::from_quote(&quote).unwrap();
        assert_eq!(metrics.volume_label(), "0");
        assert_eq!(metrics.change_label(), "0.00");
    }

    #[test]
    fn test_no_price_means_no_metrics() {
        let quote = QuoteSnapshot::default().with("previousClose", 100.0);
        assert!(SummaryMetrics::from_quote(&quote).is_none());
    }

    #[test]
    fn test_no_previous_close_means_no_metrics() {
        let quote = QuoteSnapshot::default().with("currentPrice", 100.0);
        assert!(SummaryMetrics::from_quote(&quote).is_none());
    }
}

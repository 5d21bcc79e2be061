//! Supported markets and ticker resolution

use crate::error::{Result, StockError};
use clap::ValueEnum;
use std::fmt;

/// A stock market the dashboard can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Market {
    /// NASDAQ / NYSE
    #[default]
    #[value(name = "usa")]
    Usa,
    /// National Stock Exchange of India
    #[value(name = "india-nse")]
    IndiaNse,
    /// Bombay Stock Exchange
    #[value(name = "india-bse")]
    IndiaBse,
    /// Shanghai Stock Exchange
    #[value(name = "china-sse")]
    ChinaSse,
    /// Stock Exchange of Hong Kong
    #[value(name = "china-sehk")]
    ChinaSehk,
    /// Japan Exchange Group
    #[value(name = "japan-jpx")]
    JapanJpx,
}

impl Market {
    /// Every market, in selector order
    pub const ALL: [Market; 6] = [
        Market::Usa,
        Market::IndiaNse,
        Market::IndiaBse,
        Market::ChinaSse,
        Market::ChinaSehk,
        Market::JapanJpx,
    ];

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Market::Usa => "USA (NASDAQ/NYSE)",
            Market::IndiaNse => "India (NSE)",
            Market::IndiaBse => "India (BSE)",
            Market::ChinaSse => "China (SSE)",
            Market::ChinaSehk => "China (SEHK)",
            Market::JapanJpx => "Japan (JPX)",
        }
    }

    /// Ticker suffix used by the data provider (empty for the USA)
    pub fn suffix(self) -> &'static str {
        match self {
            Market::Usa => "",
            Market::IndiaNse => ".NS",
            Market::IndiaBse => ".BO",
            Market::ChinaSse => ".SS",
            Market::ChinaSehk => ".HK",
            Market::JapanJpx => ".T",
        }
    }

    /// Placeholder ticker shown in the symbol prompt
    pub fn example(self) -> &'static str {
        match self {
            Market::Usa => "TSLA",
            Market::IndiaNse => "RELIANCE",
            Market::IndiaBse => "TCS",
            Market::ChinaSse => "600519",
            Market::ChinaSehk => "0700",
            Market::JapanJpx => "7203",
        }
    }

    /// Command-line key (e.g. `india-nse`)
    pub fn key(self) -> &'static str {
        match self {
            Market::Usa => "usa",
            Market::IndiaNse => "india-nse",
            Market::IndiaBse => "india-bse",
            Market::ChinaSse => "china-sse",
            Market::ChinaSehk => "china-sehk",
            Market::JapanJpx => "japan-jpx",
        }
    }

    /// Parse a market from its key, full label, or a label prefix
    ///
    /// Matching is case-insensitive. A prefix must pick exactly one market.
    pub fn parse(input: &str) -> Option<Market> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(market) = Self::ALL
            .into_iter()
            .find(|m| m.key() == needle || m.label().to_lowercase() == needle)
        {
            return Some(market);
        }

        let mut candidates = Self::ALL
            .into_iter()
            .filter(|m| m.label().to_lowercase().starts_with(&needle));
        match (candidates.next(), candidates.next()) {
            (Some(market), None) => Some(market),
            _ => None,
        }
    }

    /// Resolve user input into the full data-provider ticker
    ///
    /// Input is trimmed and upper-cased. The market suffix is appended unless
    /// the symbol already ends with it.
    ///
    /// # Example
    ///
    /// ```
    /// use stock_analyst::Market;
    ///
    /// assert_eq!(Market::IndiaNse.resolve_ticker("reliance").unwrap(), "RELIANCE.NS");
    /// assert_eq!(Market::IndiaNse.resolve_ticker("RELIANCE.NS").unwrap(), "RELIANCE.NS");
    /// assert_eq!(Market::Usa.resolve_ticker(" tsla ").unwrap(), "TSLA");
    /// ```
    pub fn resolve_ticker(self, input: &str) -> Result<String> {
        let symbol = input.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(StockError::InvalidSymbol(
                "stock symbol must not be empty".to_string(),
            ));
        }

        if symbol.ends_with(self.suffix()) {
            Ok(symbol)
        } else {
            Ok(format!("{symbol}{}", self.suffix()))
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_examples() {
        assert_eq!(Market::Usa.resolve_ticker("tsla").unwrap(), "TSLA");
        assert_eq!(
            Market::IndiaNse.resolve_ticker("RELIANCE").unwrap(),
            "RELIANCE.NS"
        );
        assert_eq!(
            Market::IndiaNse.resolve_ticker("RELIANCE.NS").unwrap(),
            "RELIANCE.NS"
        );
        assert_eq!(Market::JapanJpx.resolve_ticker("7203 ").unwrap(), "7203.T");
        assert_eq!(Market::ChinaSehk.resolve_ticker("0700").unwrap(), "0700.HK");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        for market in Market::ALL {
            let once = market.resolve_ticker(market.example()).unwrap();
            let twice = market.resolve_ticker(&once).unwrap();
            assert_eq!(once, twice, "{market}");
            assert!(once.ends_with(market.suffix()));
        }
    }

    #[test]
    fn test_lowercase_suffix_not_duplicated() {
        assert_eq!(Market::IndiaBse.resolve_ticker("tcs.bo").unwrap(), "TCS.BO");
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let err = Market::Usa.resolve_ticker("   ").unwrap_err();
        assert!(matches!(err, StockError::InvalidSymbol(_)));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Market::parse("india-nse"), Some(Market::IndiaNse));
        assert_eq!(Market::parse("USA"), Some(Market::Usa));
        assert_eq!(Market::parse("japan (jpx)"), Some(Market::JapanJpx));
        assert_eq!(Market::parse("China (SE"), Some(Market::ChinaSehk));
        // "India" matches two labels
        assert_eq!(Market::parse("India"), None);
        assert_eq!(Market::parse(""), None);
        assert_eq!(Market::parse("mars"), None);
    }

    #[test]
    fn test_keys_match_value_enum() {
        for market in Market::ALL {
            let parsed = Market::from_str(market.key(), false).unwrap();
            assert_eq!(parsed, market);
        }
    }
}

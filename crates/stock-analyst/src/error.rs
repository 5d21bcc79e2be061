//! Error types for the stock analyst

use thiserror::Error;

/// Stock analyst specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// The market does not know this ticker
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        /// Ticker
        symbol: String,
        /// What was missing
        reason: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Web search error
    #[error("Search error: {0}")]
    SearchError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The recommendation pipeline failed
    #[error("{0}")]
    Pipeline(#[from] crew_core::Error),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] crew_llm::LLMError),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Whether this error means "no such ticker or no data for it"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InvalidSymbol(_) | Self::DataUnavailable { .. })
    }
}

/// Convert StockError to crew_core::Error
impl From<StockError> for crew_core::Error {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Pipeline(inner) => inner,
            other => crew_core::Error::Generic(other.to_string()),
        }
    }
}

impl From<crew_utils::ConfigError> for StockError {
    fn from(err: crew_utils::ConfigError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidSymbol("NOPE.NS".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: NOPE.NS");

        let err = StockError::DataUnavailable {
            symbol: "TSLA".to_string(),
            reason: "no quotes in window".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for TSLA: no quotes in window"
        );
    }

    #[test]
    fn test_not_found_category() {
        assert!(StockError::InvalidSymbol("X".to_string()).is_not_found());
        assert!(!StockError::ApiError("500".to_string()).is_not_found());
    }

    #[test]
    fn test_pipeline_error_round_trip() {
        let core = crew_core::Error::stage("Strategic Stock Trader", "timeout");
        let stock: StockError = core.into();
        assert_eq!(
            stock.to_string(),
            "Stage 'Strategic Stock Trader' failed: timeout"
        );

        let back: crew_core::Error = stock.into();
        assert!(matches!(back, crew_core::Error::StageFailed { .. }));
    }

    #[test]
    fn test_error_conversion() {
        let err: crew_core::Error = StockError::ApiError("Test error".to_string()).into();
        match err {
            crew_core::Error::Generic(msg) => assert!(msg.contains("API error")),
            other => panic!("Expected Generic variant, got {other:?}"),
        }
    }
}

//! Yahoo Finance API client

use crate::api::MarketDataSource;
use crate::data::{MarketData, PriceBar, PriceSeries, QuoteSnapshot};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use url::Url;
use yahoo_finance_api as yahoo;

/// Chart endpoint whose metadata carries the quote snapshot
pub const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) stock-analyst";

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    http: Client,
    chart_base: Url,
    timeout: Duration,
    history_months: u32,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: Duration, history_months: u32) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let chart_base = Url::parse(CHART_BASE_URL)
            .map_err(|e| StockError::ConfigError(format!("invalid chart URL: {e}")))?;

        Ok(Self {
            http,
            chart_base,
            timeout,
            history_months,
        })
    }

    /// Chart URL for a ticker, requesting one day of data
    pub fn chart_url(&self, ticker: &str) -> Result<Url> {
        let mut url = self.chart_base.clone();
        url.path_segments_mut()
            .map_err(|()| StockError::ConfigError("chart URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("range", "1d")
            .append_pair("interval", "1d");
        Ok(url)
    }

    /// Get the quote snapshot for a ticker from the chart metadata
    #[instrument(skip(self))]
    pub async fn get_quote(&self, ticker: &str) -> Result<QuoteSnapshot> {
        let url = self.chart_url(ticker)?;
        debug!(%url, "Requesting chart metadata");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        parse_chart_meta(status, ticker, &body)
    }

    /// Get the trailing price history for a ticker
    #[instrument(skip(self))]
    pub async fn get_history(&self, ticker: &str) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = end
            .checked_sub_months(Months::new(self.history_months))
            .ok_or_else(|| {
                StockError::ConfigError(format!(
                    "cannot go back {} months from {end}",
                    self.history_months
                ))
            })?;

        self.get_historical_quotes(ticker, start, end).await
    }

    /// Get historical quotes between two instants
    pub async fn get_historical_quotes(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let provider = yahoo::YahooConnector::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            StockError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(ticker, start_odt, end_odt)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        series_from_response(ticker, &response)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn fetch(&self, ticker: &str) -> Result<MarketData> {
        let quote = self.get_quote(ticker).await?;
        let series = self.get_history(ticker).await?;
        debug!(ticker, bars = series.len(), fields = quote.len(), "Market data fetched");
        Ok(MarketData { series, quote })
    }

    async fn quote(&self, ticker: &str) -> Result<QuoteSnapshot> {
        self.get_quote(ticker).await
    }
}

/// Interpret a chart endpoint response
///
/// A 404 or a `Not Found` error object means the ticker does not exist.
pub fn parse_chart_meta(status: StatusCode, ticker: &str, body: &Value) -> Result<QuoteSnapshot> {
    if let Some(error) = body.pointer("/chart/error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_str).unwrap_or("");
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or(code);

        if code.eq_ignore_ascii_case("Not Found") || status == StatusCode::NOT_FOUND {
            return Err(StockError::InvalidSymbol(ticker.to_string()));
        }
        return Err(StockError::ApiError(format!("{code}: {description}")));
    }

    if status == StatusCode::NOT_FOUND {
        return Err(StockError::InvalidSymbol(ticker.to_string()));
    }
    if !status.is_success() {
        return Err(StockError::ApiError(format!("HTTP {status} for {ticker}")));
    }

    body.pointer("/chart/result/0/meta")
        .cloned()
        .map(QuoteSnapshot::from_value)
        .ok_or_else(|| StockError::DataUnavailable {
            symbol: ticker.to_string(),
            reason: "chart response has no metadata".to_string(),
        })
}

/// Turn a chart history response into a price series
///
/// A window without quotes is a valid, empty series. Any other problem with
/// the payload, such as misaligned columns, is an error.
pub fn series_from_response(ticker: &str, response: &yahoo::YResponse) -> Result<PriceSeries> {
    let quotes = match response.quotes() {
        Ok(quotes) => quotes,
        Err(e @ (yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult)) => {
            debug!(ticker, "No quotes in window: {e}");
            Vec::new()
        }
        Err(e) => return Err(StockError::YahooFinanceError(e.to_string())),
    };

    let bars = quotes
        .iter()
        .filter_map(|q| {
            Some(PriceBar {
                timestamp: DateTime::from_timestamp(q.timestamp, 0)?,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
                adjclose: q.adjclose,
            })
        })
        .collect();

    Ok(PriceSeries::new(ticker, bars))
}

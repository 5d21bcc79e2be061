//! Tavily web search client
//!
//! See: https://docs.tavily.com/documentation/api-reference/endpoint/search

use crate::api::SearchProvider;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Search endpoint
pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Tavily client
///
/// A missing credential is only reported when a search is attempted.
#[derive(Debug, Clone)]
pub struct TavilyClient {
    http: Client,
    api_key: Option<String>,
    endpoint: Url,
    max_results: usize,
}

impl TavilyClient {
    /// Create a new client
    pub fn new(api_key: Option<String>, max_results: usize, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let endpoint = Url::parse(TAVILY_SEARCH_URL)
            .map_err(|e| StockError::ConfigError(format!("invalid search URL: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint,
            max_results,
        })
    }

    /// Point the client at another endpoint
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Whether a credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body<'a>(&self, query: &'a str) -> SearchRequest<'a> {
        SearchRequest {
            query,
            max_results: self.max_results,
            search_depth: "basic",
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            StockError::ConfigError(format!(
                "{} is not set",
                crate::config::TAVILY_API_KEY_VAR
            ))
        })?;

        let query = query.trim();
        if query.is_empty() {
            return Err(StockError::SearchError("query must not be empty".to_string()));
        }

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&self.request_body(query))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::SearchError(format!("HTTP {status}: {body}")));
        }

        let parsed: SearchResponse = response.json().await?;
        debug!(results = parsed.results.len(), "Search completed");
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    /// Answers a single request on a local port; the handle yields the raw request
    async fn serve_once(response: String) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (Url::parse(&format!("http://{addr}/search")).unwrap(), handle)
    }

    fn local_client(endpoint: Url) -> TavilyClient {
        TavilyClient::new(Some("tvly-test".to_string()), 3, Duration::from_secs(5))
            .unwrap()
            .with_endpoint(endpoint)
    }

    #[test]
    fn test_request_body() {
        let client = TavilyClient::new(Some("tvly-test".to_string()), 5, Duration::from_secs(5))
            .unwrap();
        let body = serde_json::to_value(client.request_body("TSLA news")).unwrap();
        assert_eq!(
            body,
            json!({"query": "TSLA news", "max_results": 5, "search_depth": "basic"})
        );
    }

    #[test]
    fn test_response_parsing_tolerates_missing_fields() {
        let raw = json!({
            "query": "TSLA",
            "results": [
                {
                    "title": "Tesla jumps",
                    "url": "https://example.com/a",
                    "content": "Shares rose",
                    "score": 0.91
                },
                {"url": "https://example.com/b"}
            ]
        });
        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].score, Some(0.91));
        assert_eq!(parsed.results[1].title, "");
    }

    #[tokio::test]
    async fn test_missing_credential_fails_at_call_time() {
        let client = TavilyClient::new(Some("  ".to_string()), 5, Duration::from_secs(5)).unwrap();
        assert!(!client.has_credential());

        let err = client.search("TSLA").await.unwrap_err();
        assert!(matches!(err, StockError::ConfigError(ref msg) if msg.contains("TAVILY_API_KEY")));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let client = TavilyClient::new(Some("tvly-test".to_string()), 5, Duration::from_secs(5))
            .unwrap();
        let err = client.search("   ").await.unwrap_err();
        assert!(matches!(err, StockError::SearchError(_)));
    }

    #[tokio::test]
    async fn test_search_posts_query_with_bearer_token() {
        let body = json!({
            "query": "TSLA news",
            "results": [{
                "title": "Tesla jumps",
                "url": "https://example.com/a",
                "content": "Shares rose",
                "score": 0.91
            }]
        })
        .to_string();
        let (endpoint, server) = serve_once(http_response("200 OK", &body)).await;

        let results = local_client(endpoint).search("  TSLA news ").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Tesla jumps");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /search "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer tvly-test"));
        assert!(request.contains(r#""query":"TSLA news""#));
        assert!(request.contains(r#""max_results":3"#));
    }

    #[tokio::test]
    async fn test_http_error_keeps_status_and_body() {
        let body = r#"{"detail":{"error":"Unauthorized: missing or invalid API key."}}"#;
        let (endpoint, server) = serve_once(http_response("401 Unauthorized", body)).await;

        let err = local_client(endpoint).search("TSLA").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Search error: HTTP 401 Unauthorized: {body}")
        );
        server.await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires network access and TAVILY_API_KEY
    async fn test_search_live() {
        let api_key = std::env::var("TAVILY_API_KEY").ok();
        let client = TavilyClient::new(api_key, 3, Duration::from_secs(30)).unwrap();
        let results = client.search("Tesla stock news").await.unwrap();
        assert!(!results.is_empty());
    }
}

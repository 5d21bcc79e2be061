//! Tool for searching the web

use crate::api::{SearchProvider, SearchResult};
use async_trait::async_trait;
use crew_tools::{Tool, ToolArgument, ToolError};
use std::fmt::Write;
use std::sync::Arc;

/// Tool name as the model sees it
pub const WEB_SEARCH_TOOL: &str = "internet_search";

/// Longest snippet passed back to the model, in characters
const MAX_SNIPPET_CHARS: usize = 800;

/// Tool for free-text web search
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    /// Create a new web search tool
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

/// Numbered snippet list, or a "No results" line
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results found for '{query}'.");
    }

    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let snippet: String = result.content.trim().chars().take(MAX_SNIPPET_CHARS).collect();
        let _ = writeln!(out, "{}. {}", i + 1, result.title.trim());
        let _ = writeln!(out, "   URL: {}", result.url);
        let _ = writeln!(out, "   {snippet}");
    }
    out.truncate(out.trim_end().len());
    out
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        WEB_SEARCH_TOOL
    }

    fn description(&self) -> &'static str {
        "Searches the internet about a given topic."
    }

    fn argument(&self) -> ToolArgument {
        ToolArgument::new("query", "What to search for")
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("query must not be empty".to_string()));
        }

        let results = self
            .provider
            .search(query)
            .await
            .map_err(ToolError::failed)?;

        Ok(format_results(query, &results))
    }
}

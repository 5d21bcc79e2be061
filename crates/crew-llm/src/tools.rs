//! Tool definition types for LLM tool use

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Tool definition sent to the LLM provider
///
/// Describes a tool the model may call: its name, a description the model
/// uses to decide when to call it, and a JSON schema for its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the tool in the registry)
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Definition for a tool taking a single required string argument
    ///
    /// # Example
    ///
    /// ```
    /// use crew_llm::ToolDefinition;
    ///
    /// let def = ToolDefinition::single_string(
    ///     "internet_search",
    ///     "Searches the internet about a given topic.",
    ///     "query",
    ///     "Free-text search query",
    /// );
    /// assert_eq!(def.input_schema["required"][0], "query");
    /// ```
    pub fn single_string(
        name: impl Into<String>,
        description: impl Into<String>,
        argument: &str,
        argument_description: &str,
    ) -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                argument: {
                    "type": "string",
                    "description": argument_description,
                }
            },
            "required": [argument],
        });
        Self::new(name, description, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_string_schema() {
        let def = ToolDefinition::single_string(
            "live_stock_information",
            "Retrieves the latest stock price and relevant info.",
            "stock_symbol",
            "Ticker symbol",
        );

        assert_eq!(def.name, "live_stock_information");
        assert_eq!(def.input_schema["type"], "object");
        assert_eq!(
            def.input_schema["properties"]["stock_symbol"]["type"],
            "string"
        );
        assert_eq!(def.input_schema["required"], json!(["stock_symbol"]));
    }
}

//! Kickoff inputs for a pipeline run
//!
//! A `Context` is created fresh for every run. Its inputs are the template
//! variables task descriptions are rendered against (e.g. `stock`).

use serde::Serialize;
use serde_json::{Map, Value};

/// Well-known input keys
pub mod keys {
    /// The resolved ticker a run is about
    pub const STOCK: &str = "stock";
}

/// Per-run inputs passed to a pipeline kickoff
///
/// # Example
///
/// ```
/// use crew_core::Context;
///
/// let ctx = Context::new().with_input("stock", "RELIANCE.NS");
/// assert_eq!(ctx.input_str("stock"), Some("RELIANCE.NS"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    inputs: Map<String, Value>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a run about one ticker
    pub fn for_stock(ticker: impl Into<String>) -> Self {
        Self::new().with_input(keys::STOCK, ticker.into())
    }

    /// Add an input (builder form)
    pub fn with_input(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace an input
    ///
    /// Values that fail to serialize are stored as `null`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.inputs.insert(key.into(), value);
    }

    /// Get an input value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inputs.get(key)
    }

    /// Get an input as a string slice
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The ticker of a stock run, if set
    pub fn stock(&self) -> Option<&str> {
        self.input_str(keys::STOCK)
    }

    /// All inputs as a JSON object, for template rendering
    pub fn template_vars(&self) -> Value {
        Value::Object(self.inputs.clone())
    }

    /// Number of inputs
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether no inputs were provided
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

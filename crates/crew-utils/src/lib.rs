//! Shared utilities for stock-crew
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and helpers for reading configuration from the environment.

pub mod config;
pub mod logging;

pub use config::{ConfigError, EnvLookup, env_lookup, load_dotenv, parse_var, read_var};
pub use logging::{LogFormat, init_tracing};

//! Core abstractions for stock-crew
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace: a [`Stage`] turns an [`Assignment`] into text, a [`Context`]
//! carries the kickoff inputs of one run, and [`Error`] is the failure type
//! that crosses stage boundaries.

pub mod context;
pub mod error;
pub mod stage;

pub use context::Context;
pub use error::{Error, Result};
pub use stage::{Assignment, Stage};

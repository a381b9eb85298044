//! Error types for codeclean library.
//!
//! The sanitize/classify/validate pipeline itself never fails. These errors
//! come from the edges: loading marker configuration, rejecting bad
//! thresholds, and file or task handling in the async API.

use std::io;
use thiserror::Error;

/// Result type alias for codeclean operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for codeclean library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Marker configuration could not be parsed.
    #[error("Marker configuration error: {0}")]
    Json(#[from] serde_json::Error),

    /// A marker entry is unusable (e.g., empty pattern).
    #[error("Invalid marker: {0}")]
    InvalidMarker(String),

    /// A ratio threshold is outside 0.0..=1.0.
    #[error("Invalid threshold for {name}: {value} (expected 0.0..=1.0)")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// A background task failed to complete.
    #[error("Task error: {0}")]
    Task(String),
}

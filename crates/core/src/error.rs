//! Error types for the sessionlab pipeline.
//!
//! Data-quality problems (paused rows, zero volume, missing values, extreme
//! returns) are never errors; the cleaner filters and counts them. Errors
//! are reserved for malformed input shapes, bad configuration, and I/O.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sessionlab pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input shape error (non-chronological or duplicate timestamps).
    #[error("Input shape error: {0}")]
    InputShape(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an input shape error.
    pub fn input_shape(msg: impl Into<String>) -> Self {
        Error::InputShape(msg.into())
    }
}

//! Error types for the sipwise_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sipwise_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Profile cannot produce a finite BAC (weight/height not positive)
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// A drink event with non-positive ABV or volume
    #[error("Invalid drink #{index}: {reason}")]
    InvalidDrinkEvent { index: usize, reason: String },

    /// A water log with a volume that is not positive and finite
    #[error("Invalid water log #{index}: {reason}")]
    InvalidWaterLog { index: usize, reason: String },

    /// A computed quantity overflowed its representation
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Text input that could not be parsed (units, tags, drink specs)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

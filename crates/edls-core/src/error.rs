//! Error types for edls-core.
//!
//! Every fallible operation in the library returns [`Error`]. Provider
//! handlers never let these escape to the editor; they log and fall back to
//! their documented "no result" values instead.

use std::path::PathBuf;

/// The main error type for edls-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An editor position or range did not use the 1-based convention.
    #[error("invalid editor position: line {line}, column {column}")]
    InvalidPosition {
        /// Line number as supplied by the editor.
        line: u32,
        /// Column as supplied by the editor.
        column: u32,
    },

    /// The backend answered a request with an error.
    #[error("backend error: {code} - {message}")]
    Backend {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the backend.
        message: String,
    },

    /// The backend did not answer in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The backend answered with a payload of the wrong shape.
    #[error("malformed response to {method}: {source}")]
    MalformedResponse {
        /// Method the response belongs to.
        method: &'static str,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The editor cancelled the invocation before the response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Invalid configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// A specialized Result type for edls-core operations.
pub type Result<T> = std::result::Result<T, Error>;

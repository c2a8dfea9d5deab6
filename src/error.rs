//! # Error Types
//!
//! Custom error types for Switch2 Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for Switch2 Bridge
#[derive(Debug, Error)]
pub enum Switch2BridgeError {
    /// Configuration errors (file parsing and validation)
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Switch2 Bridge
pub type Result<T> = std::result::Result<T, Switch2BridgeError>;

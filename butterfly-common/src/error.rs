//! Error types for the butterfly-osm toolkit
//!
//! Covers the failures shared by every crate: file I/O, configuration
//! parsing and malformed user input. Request-level routing failures have
//! their own status-carrying error in `butterfly-routing`.

use thiserror::Error;

/// Main error type for butterfly-osm operations
#[derive(Debug, Error)]
pub enum Error {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file could not be parsed or holds an invalid value
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Invalid parameters supplied by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience result type for butterfly-osm operations
pub type Result<T> = std::result::Result<T, Error>;

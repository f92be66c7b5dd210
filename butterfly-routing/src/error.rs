//! Request status errors
//!
//! Every variant terminates the request. `code()` is the wire code the
//! response carries next to the message.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The search algorithm lacks a capability the request needs
    #[error("{0}")]
    NotImplemented(String),

    /// Malformed or inconsistent request parameters
    #[error("{0}")]
    InvalidOptions(String),

    /// A parameter value the loaded dataset does not support
    #[error("{0}")]
    InvalidValue(String),

    /// Request exceeds a configured size limit
    #[error("{0}")]
    TooBig(String),

    /// One or more coordinates could not be snapped to the network
    #[error("{0}")]
    NoSegment(String),

    /// The search returned no matrix for a requested annotation
    #[error("{0}")]
    NoTable(String),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotImplemented(_) => "NotImplemented",
            Error::InvalidOptions(_) => "InvalidOptions",
            Error::InvalidValue(_) => "InvalidValue",
            Error::TooBig(_) => "TooBig",
            Error::NoSegment(_) => "NoSegment",
            Error::NoTable(_) => "NoTable",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::NotImplemented(msg)
            | Error::InvalidOptions(msg)
            | Error::InvalidValue(msg)
            | Error::TooBig(msg)
            | Error::NoSegment(msg)
            | Error::NoTable(msg) => msg,
        }
    }
}

/// Serializable error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.message().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

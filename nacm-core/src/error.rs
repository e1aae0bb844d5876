//! Error types for nacm-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Instance-identifier expression could not be parsed
    #[error("Path syntax error: {0}")]
    PathSyntax(String),

    /// Prefix not bound in the namespace context
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Namespace not registered with any YANG module
    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a path syntax error
    pub fn path_syntax(msg: impl Into<String>) -> Self {
        Error::PathSyntax(msg.into())
    }

    /// Create an unknown prefix error
    pub fn unknown_prefix(prefix: impl Into<String>) -> Self {
        Error::UnknownPrefix(prefix.into())
    }

    /// Create an unknown namespace error
    pub fn unknown_namespace(ns: impl Into<String>) -> Self {
        Error::UnknownNamespace(ns.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

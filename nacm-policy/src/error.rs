//! Engine error types
//!
//! Denied access is a verdict, not an error: [`PolicyError`] covers only
//! configuration faults and collaborator failures, either of which aborts
//! the evaluation.

use thiserror::Error;

/// Access-control engine errors
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy has no `write-default` leaf; write evaluation cannot
    /// fall back to a default action
    #[error("No nacm write-default rule")]
    MissingWriteDefault,

    /// Unrecognised policy mode selector
    #[error("Invalid NACM mode: {0}")]
    InvalidMode(String),

    /// Failure in the data-tree or schema collaborator, propagated unchanged
    #[error(transparent)]
    Core(#[from] nacm_core::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PolicyError>;

//! Structured deny payload
//!
//! The engine reports denied RPC and write requests with an
//! `access-denied` payload; the transport layer owns the wire encoding.

use serde::{Deserialize, Serialize};

/// Structured `access-denied` error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDenied {
    /// Error type, `application` for access-control denies
    pub error_type: String,
    /// Always `access-denied`
    pub error_tag: String,
    /// Human-readable reason (`access denied` or `default deny`)
    pub message: String,
}

impl AccessDenied {
    /// Application-level deny with the given message
    pub fn application(message: impl Into<String>) -> Self {
        AccessDenied {
            error_type: "application".to_string(),
            error_tag: "access-denied".to_string(),
            message: message.into(),
        }
    }
}

//! Chat transport error types

use crate::classify::FailureKind;
use thiserror::Error;

/// Chat error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ChatError {
    pub kind: FailureKind,
    /// Diagnostic message for logs
    pub message: String,
    /// Server-supplied description, safe to show the user
    pub detail: Option<String>,
    /// HTTP status when a response was received
    pub status: Option<u16>,
}

impl ChatError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Network, message)
    }

    pub fn service(status: u16, detail: Option<String>) -> Self {
        Self {
            kind: FailureKind::Service,
            message: format!("HTTP {status}"),
            detail,
            status: Some(status),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Malformed, message)
    }
}

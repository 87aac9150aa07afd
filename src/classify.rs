//! Failure classification into user-facing messages

use serde::{Deserialize, Serialize};

pub const NETWORK_MESSAGE: &str = "Error connecting to service.";
pub const SERVICE_FALLBACK: &str = "The FAQ service could not answer right now. Please try again.";
pub const MALFORMED_MESSAGE: &str =
    "Received an unexpected response from the FAQ service. Please try again.";

const MAX_DETAIL_CHARS: usize = 300;

/// Failure taxonomy for a single turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No response received (connect failure, timeout, broken body)
    Network,
    /// Response received with a non-success status
    Service,
    /// Success status but the payload lacks the expected fields
    Malformed,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Network => "network",
            FailureKind::Service => "service",
            FailureKind::Malformed => "malformed",
        }
    }
}

/// Map a failure to the single message shown to the user.
///
/// Total over every kind and detail: a missing, blank or garbled detail
/// falls back to a fixed phrase.
pub fn classify(kind: FailureKind, detail: Option<&str>) -> String {
    match kind {
        FailureKind::Network => NETWORK_MESSAGE.to_string(),
        FailureKind::Service => match detail.and_then(sanitize_detail) {
            Some(detail) => format!("The FAQ service reported an error: {detail}"),
            None => SERVICE_FALLBACK.to_string(),
        },
        FailureKind::Malformed => MALFORMED_MESSAGE.to_string(),
    }
}

fn sanitize_detail(detail: &str) -> Option<String> {
    let cleaned: String = detail
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() > MAX_DETAIL_CHARS {
        let truncated: String = trimmed.chars().take(MAX_DETAIL_CHARS).collect();
        return Some(format!("{truncated}..."));
    }
    Some(trimmed.to_string())
}

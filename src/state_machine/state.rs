//! Dispatch state types

use crate::classify::FailureKind;
use crate::config::InputPolicy;
use crate::context::ContextMode;
use serde::Serialize;

/// The single request a session may have outstanding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRequest {
    /// Submitted text, already trimmed
    pub text: String,
    /// Exactly what the user typed, for restoring into the draft
    pub draft: String,
}

/// Dispatcher state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchState {
    /// Ready for input, nothing sent yet this session
    #[default]
    Idle,

    /// Request in flight; further submissions are rejected
    Sending { pending: PendingRequest },

    /// Last turn was answered
    Answered,

    /// Last turn failed; the next submission retries with unchanged context
    Failed { kind: FailureKind },
}

impl DispatchState {
    pub fn is_sending(&self) -> bool {
        matches!(self, DispatchState::Sending { .. })
    }
}

/// Immutable per-session configuration the transition function consults
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionContext {
    pub mode: ContextMode,
    pub input_policy: InputPolicy,
}

impl SessionContext {
    pub fn new(mode: ContextMode, input_policy: InputPolicy) -> Self {
        Self { mode, input_policy }
    }
}

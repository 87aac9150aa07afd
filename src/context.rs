//! Conversational context carried between turns
//!
//! Two deployments exist: the service either hands back an opaque context
//! blob that must be echoed verbatim on the next request, or it keeps the
//! memory itself keyed by session id. The mode is fixed when a session is
//! built and every mode-specific decision lives here.

use crate::identity::SessionId;
use crate::service::{ChatError, ChatRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How conversational memory reaches the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// Service returns a context blob; the client echoes it back unmodified
    #[default]
    Echoed,
    /// Service tracks context itself, keyed by `session_id`
    SessionKeyed,
}

impl ContextMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextMode::Echoed => "echoed",
            ContextMode::SessionKeyed => "session",
        }
    }

    /// Context held before the first successful turn
    pub fn empty_state(self) -> ContextState {
        match self {
            ContextMode::Echoed => ContextState::Echoed(Value::Array(Vec::new())),
            ContextMode::SessionKeyed => ContextState::Absent,
        }
    }

    /// Build the outgoing payload for one turn.
    pub fn build_request(
        self,
        message: &str,
        session_id: &SessionId,
        context: ContextState,
    ) -> ChatRequest {
        match self {
            ContextMode::Echoed => ChatRequest {
                message: message.to_string(),
                session_id: None,
                context: context.into_value(),
            },
            ContextMode::SessionKeyed => ChatRequest {
                message: message.to_string(),
                session_id: Some(session_id.to_string()),
                context: None,
            },
        }
    }

    /// Pull the next context out of a successful reply.
    ///
    /// In echoed mode a reply without context (or with `null`) is malformed.
    /// In session-keyed mode any returned context is ignored.
    pub fn extract_context(self, returned: Option<Value>) -> Result<ContextState, ChatError> {
        match self {
            ContextMode::Echoed => match returned {
                Some(Value::Null) | None => {
                    Err(ChatError::malformed("reply is missing the context field"))
                }
                Some(value) => Ok(ContextState::Echoed(value)),
            },
            ContextMode::SessionKeyed => {
                if returned.is_some() {
                    tracing::debug!("Ignoring context returned in session-keyed mode");
                }
                Ok(ContextState::Absent)
            }
        }
    }
}

/// Context attached to the next outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum ContextState {
    /// Opaque server-owned structure, round-tripped unmodified
    Echoed(Value),
    /// Server keeps the memory; nothing is sent
    Absent,
}

impl ContextState {
    fn into_value(self) -> Option<Value> {
        match self {
            ContextState::Echoed(value) => Some(value),
            ContextState::Absent => None,
        }
    }
}

/// Holds the last known-good context for a session
#[derive(Debug, Clone)]
pub struct ContextLedger {
    mode: ContextMode,
    state: ContextState,
}

impl ContextLedger {
    pub fn new(mode: ContextMode) -> Self {
        Self {
            mode,
            state: mode.empty_state(),
        }
    }

    pub fn snapshot(&self) -> ContextState {
        self.state.clone()
    }

    /// Replace the held context wholesale. The service is authoritative for
    /// its shape, so nothing is merged.
    pub fn update(&mut self, new_state: ContextState) {
        self.state = new_state;
    }

    /// Back to the mode's empty value, for a new session.
    pub(crate) fn reset(&mut self) {
        self.state = self.mode.empty_state();
    }
}

//! Effects produced by state transitions

use crate::context::ContextState;
use crate::transcript::Turn;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to the transcript
    AppendTurn { turn: Turn },

    /// Send the pending turn to the service (spawns as background task)
    SendRequest { text: String },

    /// Overwrite the ledger with context returned by the service
    UpdateContext { context: ContextState },

    /// Replace the draft
    SetDraft { text: String },

    /// Empty the draft
    ClearDraft,

    /// Fresh id, empty transcript, empty context
    StartNewSession,
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            turn: Turn::user(text),
        }
    }

    pub fn append_bot(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            turn: Turn::bot(text),
        }
    }

    pub fn is_draft_change(&self) -> bool {
        matches!(self, Effect::SetDraft { .. } | Effect::ClearDraft)
    }
}

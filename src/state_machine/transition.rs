//! Pure state transition function

use super::{DispatchState, Effect, Event, PendingRequest, SessionContext};
use crate::classify::classify;
use crate::config::InputPolicy;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DispatchState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DispatchState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A request is already in flight, wait for it to settle")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("No request in flight to settle")]
    NothingPending,
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &DispatchState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission
        // ============================================================

        // Single-flight: nothing is accepted while a request is out
        (DispatchState::Sending { .. }, Event::Submit { .. } | Event::NewSession) => {
            Err(TransitionError::Busy)
        }

        (_, Event::Submit { text: raw }) => {
            let text = raw.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            Ok(TransitionResult::new(DispatchState::Sending {
                pending: PendingRequest {
                    text: text.to_string(),
                    draft: raw.clone(),
                },
            })
            .with_effect(Effect::append_user(text))
            .with_effect(Effect::SendRequest {
                text: text.to_string(),
            }))
        }

        // ============================================================
        // Settlement
        // ============================================================
        (DispatchState::Sending { .. }, Event::ReplyReceived { reply, context: ctx }) => {
            Ok(TransitionResult::new(DispatchState::Answered)
                .with_effect(Effect::append_bot(reply))
                .with_effect(Effect::UpdateContext { context: ctx })
                .with_effect(Effect::ClearDraft))
        }

        // Context is left alone so a retry carries what the failed attempt carried
        (DispatchState::Sending { pending }, Event::RequestFailed { kind, detail }) => {
            let message = classify(kind, detail.as_deref());
            let draft = match context.input_policy {
                InputPolicy::Clear => Effect::ClearDraft,
                InputPolicy::RestoreOnFailure => Effect::SetDraft {
                    text: pending.draft.clone(),
                },
            };
            Ok(TransitionResult::new(DispatchState::Failed { kind })
                .with_effect(Effect::append_bot(message))
                .with_effect(draft))
        }

        (_, Event::ReplyReceived { .. } | Event::RequestFailed { .. }) => {
            Err(TransitionError::NothingPending)
        }

        // ============================================================
        // Draft and session lifecycle
        // ============================================================
        (_, Event::EditDraft { text }) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::SetDraft { text }))
        }

        (_, Event::NewSession) => Ok(TransitionResult::new(DispatchState::Idle)
            .with_effect(Effect::StartNewSession)
            .with_effect(Effect::ClearDraft)),
    }
}

//! Events that can occur in a session

use crate::classify::FailureKind;
use crate::context::ContextState;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Renderer events
    Submit {
        text: String,
    },
    EditDraft {
        text: String,
    },
    NewSession,

    // Service events
    ReplyReceived {
        reply: String,
        context: ContextState,
    },
    RequestFailed {
        kind: FailureKind,
        /// Server-supplied description, if any
        detail: Option<String>,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit { text: text.into() }
    }

    pub fn failed(kind: FailureKind, detail: Option<String>) -> Self {
        Event::RequestFailed { kind, detail }
    }
}

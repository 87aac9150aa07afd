//! Reference FAQ service speaking the chat wire contract
//!
//! Serves both context deployments: requests carrying a `session_id` have
//! their history kept here, anything else gets its history echoed back as
//! `context`.

mod faq;
mod handlers;
mod sessions;

pub use faq::{FaqEntry, FaqError, FaqIndex, NO_MATCH_REPLY};
pub use handlers::create_router;
pub use sessions::SessionStore;

use std::sync::{Arc, Mutex};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub faq: Arc<FaqIndex>,
    sessions: Arc<Mutex<SessionStore>>,
    max_context: usize,
}

impl AppState {
    pub fn new(faq: FaqIndex, max_context: usize, max_sessions: usize) -> Self {
        Self {
            faq: Arc::new(faq),
            sessions: Arc::new(Mutex::new(SessionStore::new(max_sessions))),
            max_context,
        }
    }

    /// Number of session-keyed histories currently held
    pub fn session_count(&self) -> usize {
        self.sessions.lock().map_or(0, |s| s.len())
    }
}

//! Bounded store of session-keyed histories

use std::collections::HashMap;

#[derive(Debug)]
struct History {
    turns: Vec<String>,
    last_used: u64,
}

/// Histories keyed by client session id. Once `max_sessions` are held,
/// admitting a new id evicts the least recently used one.
#[derive(Debug)]
pub struct SessionStore {
    histories: HashMap<String, History>,
    clock: u64,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            histories: HashMap::new(),
            clock: 0,
            max_sessions,
        }
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Run `f` over the history for `session_id`, creating it if needed.
    pub fn with_history<R>(
        &mut self,
        session_id: &str,
        f: impl FnOnce(&mut Vec<String>) -> R,
    ) -> R {
        self.clock += 1;
        let now = self.clock;

        if !self.histories.contains_key(session_id) && self.histories.len() >= self.max_sessions {
            self.evict_least_recent();
        }

        let history = self
            .histories
            .entry(session_id.to_string())
            .or_insert_with(|| History {
                turns: Vec::new(),
                last_used: now,
            });
        history.last_used = now;
        f(&mut history.turns)
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .histories
            .iter()
            .min_by_key(|(_, h)| h.last_used)
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest {
            self.histories.remove(&id);
            tracing::debug!(session_id = %id, "Evicted session history");
        }
    }
}

//! Keyword-overlap FAQ lookup

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const NO_MATCH_REPLY: &str =
    "I couldn't find a specific answer in the FAQ. Would you like to speak to an agent?";

/// How many recent history entries are folded into a retry search
const HISTORY_WINDOW: usize = 2;

#[derive(Debug, Error)]
pub enum FaqError {
    #[error("failed to read FAQ file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse FAQ file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// In-memory FAQ with each question pre-split into keywords
#[derive(Debug, Default)]
pub struct FaqIndex {
    entries: Vec<(FaqEntry, HashSet<String>)>,
}

impl FaqIndex {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let words = keywords(&entry.question);
                (entry, words)
            })
            .collect();
        Self { entries }
    }

    /// Load a JSON array of `{question, answer}` objects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FaqError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FaqError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<FaqEntry> =
            serde_json::from_str(&raw).map_err(|source| FaqError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry sharing the most keywords with `query`. Ties go to the
    /// earlier entry; no shared keyword means no match.
    pub fn search(&self, query: &str) -> Option<&FaqEntry> {
        let query = keywords(query);
        let mut best: Option<(&FaqEntry, usize)> = None;

        for (entry, words) in &self.entries {
            let overlap = words.intersection(&query).count();
            if overlap > best.map_or(0, |(_, n)| n) {
                best = Some((entry, overlap));
            }
        }

        best.map(|(entry, _)| entry)
    }

    pub fn answer(&self, query: &str) -> String {
        self.search(query).map_or_else(|| NO_MATCH_REPLY.to_string(), format_entry)
    }

    /// Answer `message`, falling back to a search that includes the most
    /// recent history when the message alone matches nothing.
    pub fn answer_with_history(&self, message: &str, history: &[String]) -> String {
        if let Some(entry) = self.search(message) {
            return format_entry(entry);
        }
        if history.is_empty() {
            return NO_MATCH_REPLY.to_string();
        }

        let start = history.len().saturating_sub(HISTORY_WINDOW);
        let mut query = history[start..].join(" ");
        query.push(' ');
        query.push_str(message);
        self.answer(&query)
    }
}

fn format_entry(entry: &FaqEntry) -> String {
    format!("Question: {}\nAnswer: {}", entry.question, entry.answer)
}

fn keywords(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

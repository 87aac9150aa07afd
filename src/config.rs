//! Environment-driven configuration

use crate::context::ContextMode;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_FAQ_PATH: &str = "data/faq.json";
pub const DEFAULT_MAX_CONTEXT: usize = 10;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// What happens to the draft after a turn settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputPolicy {
    /// Always clear the draft
    #[default]
    Clear,
    /// Clear on success; put the submitted text back on failure
    RestoreOnFailure,
}

/// Configuration for a chat session
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub mode: ContextMode,
    pub timeout: Duration,
    pub input_policy: InputPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            mode: ContextMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            input_policy: InputPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("FAQ_CHAT_ENDPOINT") {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::invalid(
                    "FAQ_CHAT_ENDPOINT",
                    &endpoint,
                    "expected an http(s) URL",
                ));
            }
            config.endpoint = endpoint;
        }

        if let Some(mode) = lookup("FAQ_CHAT_CONTEXT_MODE") {
            config.mode = match mode.trim().to_ascii_lowercase().as_str() {
                "echoed" | "context" => ContextMode::Echoed,
                "session" | "session_keyed" => ContextMode::SessionKeyed,
                _ => {
                    return Err(ConfigError::invalid(
                        "FAQ_CHAT_CONTEXT_MODE",
                        &mode,
                        "expected `echoed` or `session`",
                    ))
                }
            };
        }

        if let Some(secs) = lookup("FAQ_CHAT_TIMEOUT_SECS") {
            let parsed: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("FAQ_CHAT_TIMEOUT_SECS", &secs, "expected seconds"))?;
            if parsed == 0 {
                return Err(ConfigError::invalid(
                    "FAQ_CHAT_TIMEOUT_SECS",
                    &secs,
                    "must be positive",
                ));
            }
            config.timeout = Duration::from_secs(parsed);
        }

        if let Some(restore) = lookup("FAQ_CHAT_RESTORE_INPUT") {
            config.input_policy = if parse_flag("FAQ_CHAT_RESTORE_INPUT", &restore)? {
                InputPolicy::RestoreOnFailure
            } else {
                InputPolicy::Clear
            };
        }

        Ok(config)
    }
}

/// Configuration for the reference FAQ service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub faq_path: PathBuf,
    /// Most recent turns kept in a returned or stored context
    pub max_context: usize,
    /// Session-keyed histories kept before the least recently used is evicted
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("FAQ_CHAT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw
            .parse()
            .map_err(|_| ConfigError::invalid("FAQ_CHAT_BIND", &bind_raw, "expected host:port"))?;

        let faq_path = lookup("FAQ_CHAT_FAQ_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_FAQ_PATH), PathBuf::from);

        let max_context = parse_count(&lookup, "FAQ_CHAT_MAX_CONTEXT", DEFAULT_MAX_CONTEXT)?;
        let max_sessions = parse_count(&lookup, "FAQ_CHAT_MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?;

        Ok(Self {
            bind,
            faq_path,
            max_context,
            max_sessions,
        })
    }
}

fn parse_count(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    let count: usize = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(var, &raw, "expected a count"))?;
    if count == 0 {
        return Err(ConfigError::invalid(var, &raw, "must be positive"));
    }
    Ok(count)
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::invalid(var, raw, "expected a boolean")),
    }
}

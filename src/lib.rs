//! FAQ chat - conversational session engine
//!
//! A client for a remote FAQ-answering service. Each session owns its
//! identity, conversational context and transcript, and drives one
//! request per user turn through a pure state machine.

pub mod classify;
pub mod config;
pub mod context;
pub mod identity;
pub mod server;
pub mod service;
pub mod session;
pub mod state_machine;
pub mod transcript;

pub use classify::{classify, FailureKind};
pub use config::{ClientConfig, ConfigError, InputPolicy, ServerConfig};
pub use context::{ContextLedger, ContextMode, ContextState};
pub use identity::SessionId;
pub use service::{ChatClient, ChatError, ChatReply, ChatRequest, HttpChatClient, LoggingClient};
pub use session::{ChatHandle, ChatSession, CommandError, SessionSnapshot};
pub use transcript::{Role, TranscriptStore, Turn};

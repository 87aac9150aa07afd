//! Session runtime and its handle
//!
//! Each session runs as its own task, owning its identity, context ledger
//! and transcript. Renderers talk to it through a cloneable [`ChatHandle`]
//! and observe it through published [`SessionSnapshot`]s.

mod executor;


use executor::SessionRuntime;

use crate::config::{ClientConfig, ConfigError};
use crate::context::ContextState;
use crate::identity::SessionId;
use crate::service::{ChatClient, HttpChatClient, LoggingClient};
use crate::state_machine::{DispatchState, Event, SessionContext, TransitionError};
use crate::transcript::Turn;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

/// Read-only view of a session, published after every change
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub turns: Vec<Turn>,
    pub context: ContextState,
    pub draft: String,
    pub state: DispatchState,
}

impl SessionSnapshot {
    pub fn is_sending(&self) -> bool {
        self.state.is_sending()
    }
}

/// Why a command did not take effect
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("session runtime has stopped")]
    Closed,
}

/// A renderer command plus the channel its acceptance is reported on
pub(crate) struct Command {
    pub event: Event,
    pub ack: oneshot::Sender<Result<(), TransitionError>>,
}

/// Entry point for starting sessions
pub struct ChatSession;

impl ChatSession {
    /// Start a session over any client.
    ///
    /// Must be called from within a Tokio runtime; the session runs as a
    /// spawned task.
    pub fn spawn<C: ChatClient + 'static>(client: C, context: SessionContext) -> ChatHandle {
        let (command_tx, command_rx) = mpsc::channel(32);
        let runtime = SessionRuntime::new(context, client, command_rx);
        let snapshot_rx = runtime.subscribe();

        tokio::spawn(async move {
            runtime.run().await;
        });

        ChatHandle {
            command_tx,
            snapshot_rx,
        }
    }

    /// Start a session against the configured HTTP endpoint.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(config: &ClientConfig) -> Result<ChatHandle, ConfigError> {
        let client = LoggingClient::new(HttpChatClient::from_config(config)?);
        Ok(Self::spawn(
            client,
            SessionContext::new(config.mode, config.input_policy),
        ))
    }
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct ChatHandle {
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl ChatHandle {
    /// Submit one user turn. Blank text, or text submitted while a
    /// request is in flight, is rejected without touching the session.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), CommandError> {
        self.send(Event::submit(text)).await
    }

    /// Replace the draft held for the renderer's input box.
    pub async fn set_draft(&self, text: impl Into<String>) -> Result<(), CommandError> {
        self.send(Event::EditDraft { text: text.into() }).await
    }

    /// Start over with a fresh id, empty transcript and empty context.
    pub async fn new_session(&self) -> Result<(), CommandError> {
        self.send(Event::NewSession).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver notified after every session change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Wait until no request is in flight, returning the settled snapshot.
    pub async fn wait_until_settled(&self, timeout: Duration) -> Option<SessionSnapshot> {
        let mut rx = self.snapshot_rx.clone();
        let settled = tokio::time::timeout(timeout, rx.wait_for(|s| !s.is_sending())).await;
        match settled {
            Ok(Ok(snapshot)) => Some(snapshot.clone()),
            _ => None,
        }
    }

    async fn send(&self, event: Event) -> Result<(), CommandError> {
        let (ack, accepted) = oneshot::channel();
        self.command_tx
            .send(Command { event, ack })
            .await
            .map_err(|_| CommandError::Closed)?;
        accepted.await.map_err(|_| CommandError::Closed)??;
        Ok(())
    }
}

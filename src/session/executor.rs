//! Session runtime executor

use super::{Command, SessionSnapshot};
use crate::classify::FailureKind;
use crate::context::ContextLedger;
use crate::identity::SessionId;
use crate::service::ChatClient;
use crate::state_machine::{
    transition, DispatchState, Effect, Event, SessionContext, TransitionError,
};
use crate::transcript::TranscriptStore;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Runs one session: applies events through the state machine and
/// executes the resulting effects.
pub struct SessionRuntime<C: ChatClient + 'static> {
    context: SessionContext,
    session_id: SessionId,
    state: DispatchState,
    ledger: ContextLedger,
    transcript: TranscriptStore,
    draft: String,
    client: Arc<C>,
    command_rx: mpsc::Receiver<Command>,
    /// Service results come back on their own channel so the runtime can
    /// stop once every handle is gone
    result_tx: mpsc::Sender<Event>,
    result_rx: mpsc::Receiver<Event>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<C: ChatClient + 'static> SessionRuntime<C> {
    pub(crate) fn new(
        context: SessionContext,
        client: C,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        let session_id = SessionId::create();
        let ledger = ContextLedger::new(context.mode);
        let (result_tx, result_rx) = mpsc::channel(4);
        let (snapshot_tx, _) = watch::channel(SessionSnapshot {
            session_id: session_id.clone(),
            turns: Vec::new(),
            context: ledger.snapshot(),
            draft: String::new(),
            state: DispatchState::Idle,
        });

        Self {
            context,
            session_id,
            state: DispatchState::Idle,
            ledger,
            transcript: TranscriptStore::new(),
            draft: String::new(),
            client: Arc::new(client),
            command_rx,
            result_tx,
            result_rx,
            snapshot_tx,
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.session_id,
            mode = self.context.mode.as_str(),
            endpoint = %self.client.endpoint(),
            "Starting session runtime"
        );

        let mut commands_open = true;
        loop {
            tokio::select! {
                command = self.command_rx.recv(), if commands_open => {
                    match command {
                        Some(Command { event, ack }) => {
                            let outcome = self.process_event(event);
                            let _ = ack.send(outcome);
                        }
                        None => commands_open = false,
                    }
                }
                Some(event) = self.result_rx.recv() => {
                    if let Err(e) = self.process_event(event) {
                        tracing::warn!(session_id = %self.session_id, error = %e, "Dropped service result");
                    }
                }
                else => break,
            }

            // Let an in-flight turn settle before stopping
            if !commands_open && !self.state.is_sending() {
                break;
            }
        }

        tracing::info!(session_id = %self.session_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(session_id = %self.session_id, error = %e, "Event rejected");
                return Err(e);
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        self.publish();

        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendTurn { turn } => {
                self.transcript.append(turn);
            }

            Effect::SendRequest { text } => {
                let request =
                    self.context
                        .mode
                        .build_request(&text, &self.session_id, self.ledger.snapshot());
                let client = self.client.clone();
                let result_tx = self.result_tx.clone();
                let mode = self.context.mode;
                let session_id = self.session_id.clone();

                // Exactly one outbound call per turn, awaited off the event loop
                tokio::spawn(async move {
                    tracing::debug!(session_id = %session_id, "Sending chat turn");

                    let call_session_id = session_id.clone();
                    let call = tokio::spawn(async move {
                        match client.send(&request).await {
                            Ok(reply) => match mode.extract_context(reply.context) {
                                Ok(context) => Event::ReplyReceived {
                                    reply: reply.reply,
                                    context,
                                },
                                Err(e) => {
                                    tracing::warn!(session_id = %call_session_id, error = %e, "Reply rejected");
                                    Event::failed(e.kind, e.detail)
                                }
                            },
                            Err(e) => Event::failed(e.kind, e.detail),
                        }
                    });

                    // A panicking client still settles the turn
                    let event = match call.await {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::error!(session_id = %session_id, error = %e, "Chat request task failed");
                            Event::failed(FailureKind::Network, None)
                        }
                    };

                    if result_tx.send(event).await.is_err() {
                        tracing::warn!(session_id = %session_id, "Session stopped before turn settled");
                    }
                });
            }

            Effect::UpdateContext { context } => {
                self.ledger.update(context);
            }

            Effect::SetDraft { text } => {
                self.draft = text;
            }

            Effect::ClearDraft => {
                self.draft.clear();
            }

            Effect::StartNewSession => {
                let previous = std::mem::replace(&mut self.session_id, SessionId::create());
                self.transcript.clear();
                self.ledger.reset();
                tracing::info!(
                    previous = %previous,
                    session_id = %self.session_id,
                    "Started new session"
                );
            }
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(SessionSnapshot {
            session_id: self.session_id.clone(),
            turns: self.transcript.all().to_vec(),
            context: self.ledger.snapshot(),
            draft: self.draft.clone(),
            state: self.state.clone(),
        });
    }
}

//! FAQ service client abstraction
//!
//! Provides a common interface for sending one chat turn to the service.

mod error;
mod http;
mod types;

pub use error::ChatError;
pub use http::HttpChatClient;
pub use types::{ChatReply, ChatRequest};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for FAQ service transports
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one turn and wait for its single response
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;

    /// Where requests go, for logging
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: ChatClient + ?Sized> ChatClient for Arc<T> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        (**self).send(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for chat clients
pub struct LoggingClient<C> {
    inner: C,
}

impl<C: ChatClient> LoggingClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ChatClient> ChatClient for LoggingClient<C> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    reply_chars = reply.reply.chars().count(),
                    has_context = reply.context.is_some(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

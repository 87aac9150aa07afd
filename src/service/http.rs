//! HTTP transport for the FAQ chat endpoint

use super::{ChatClient, ChatError, ChatReply, ChatRequest};
use crate::config::{ClientConfig, ConfigError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// JSON-over-HTTP chat client
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
}

impl HttpChatClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::new(config.endpoint.clone(), config.timeout)
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::network(format!("Connection failed: {e}"))
                } else {
                    ChatError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ChatError::service(status.as_u16(), extract_detail(&body)));
        }

        parse_reply(&body)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn parse_reply(body: &str) -> Result<ChatReply, ChatError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ChatError::malformed(format!("Failed to parse response: {e}")))?;

    let reply = value
        .get("reply")
        .and_then(Value::as_str)
        .ok_or_else(|| ChatError::malformed("response is missing the reply field"))?
        .to_string();

    Ok(ChatReply {
        reply,
        context: value.get("context").cloned(),
    })
}

/// Pull a human-readable description out of an error body.
///
/// Accepts `{"detail": "..."}` and the validation form
/// `{"detail": [{"msg": "..."}, ...]}`; anything else yields `None`.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

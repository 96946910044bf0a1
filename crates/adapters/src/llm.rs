// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat-completion collaborator: the only thing in this process that talks
//! to an LLM provider. Everything the engine needs from it is expressed as
//! one trait so the Conversation Engine never depends on a concrete provider.

use async_trait::async_trait;
use doc_core::Role;
use thiserror::Error;
use tokio::sync::mpsc;

/// One turn of prompt context handed to the model, in order.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// A finished, non-streamed chat completion.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub content: String,
    pub cost: f64,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to upstream model failed: {0}")]
    Request(String),
    #[error("model returned an unparsable response: {0}")]
    Decode(String),
}

/// Streams completion tokens over `tx` as they arrive, then resolves to the
/// full text and its cost. Matches the chat.token/chat.completed split in
/// the wire protocol (§4.5.2): the engine forwards each token to the bus as
/// it's received and emits the final event once this future resolves.
#[async_trait]
pub trait LlmClient: Send + Sync + 'static {
    async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tokens: mpsc::Sender<String>,
    ) -> Result<ChatCompletion, LlmError>;

    /// Non-streamed chat completion, used for question generation and
    /// highlight→main summarization where no token-by-token delivery is
    /// required (§4.5.4, §4.5.5).
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatCompletion, LlmError>;
}

/// Talks to an OpenAI-compatible chat completions endpoint over HTTP.
pub struct HttpLlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpLlmClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), api_key: api_key.into() }
    }

    fn body(&self, model: &str, messages: &[ChatMessage], stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": model,
            "stream": stream,
            "messages": messages.iter().map(|m| serde_json::json!({
                "role": role_str(m.role),
                "content": m.content,
            })).collect::<Vec<_>>(),
        });
        if stream {
            // Ask for a trailing usage-only chunk so the streamed path can
            // report real cost the same way the non-streamed path does.
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }
        body
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatCompletion, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.body(model, messages, false))
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;
        let parsed: serde_json::Value =
            response.json().await.map_err(|e| LlmError::Decode(e.to_string()))?;
        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::Decode("missing choices[0].message.content".to_string()))?
            .to_string();
        let cost = parsed["usage"]["total_cost"].as_f64().unwrap_or(0.0);
        Ok(ChatCompletion { content, cost })
    }

    async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tokens: mpsc::Sender<String>,
    ) -> Result<ChatCompletion, LlmError> {
        use futures_util::StreamExt;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.body(model, messages, true))
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let mut stream = response.bytes_stream();
        let mut full = String::new();
        let mut cost = 0.0;
        let mut trailing = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LlmError::Request(e.to_string()))?;
            trailing.extend_from_slice(&chunk);
            while let Some(pos) = trailing.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = trailing.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                let line = line.trim().trim_start_matches("data: ").trim();
                if line.is_empty() || line == "[DONE]" {
                    continue;
                }
                let event: serde_json::Value =
                    serde_json::from_str(line).map_err(|e| LlmError::Decode(e.to_string()))?;
                if let Some(token) = event["choices"][0]["delta"]["content"].as_str() {
                    full.push_str(token);
                    let _ = tokens.send(token.to_string()).await;
                }
                // The `stream_options.include_usage` trailer arrives as its
                // own chunk with an empty `choices` array once the stream
                // is otherwise done; read the real cost from it the same
                // way the non-streamed path reads `usage.total_cost`.
                if let Some(total_cost) = event["usage"]["total_cost"].as_f64() {
                    cost = total_cost;
                }
            }
        }
        Ok(ChatCompletion { content: full, cost })
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Deterministic fake: echoes a fixed response and a per-call cost,
    /// streaming it one word at a time so tests can exercise the
    /// chat.token → chat.completed sequencing without a network call.
    pub struct FakeLlmClient {
        pub response: Mutex<String>,
        pub cost_per_call: f64,
        pub calls: Arc<Mutex<Vec<(String, usize)>>>,
    }

    impl FakeLlmClient {
        pub fn new(response: impl Into<String>, cost_per_call: f64) -> Self {
            Self {
                response: Mutex::new(response.into()),
                cost_per_call,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn set_response(&self, response: impl Into<String>) {
            *self.response.lock() = response.into();
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlmClient {
        async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatCompletion, LlmError> {
            self.calls.lock().push((model.to_string(), messages.len()));
            Ok(ChatCompletion { content: self.response.lock().clone(), cost: self.cost_per_call })
        }

        async fn chat_stream(
            &self,
            model: &str,
            messages: &[ChatMessage],
            tokens: mpsc::Sender<String>,
        ) -> Result<ChatCompletion, LlmError> {
            self.calls.lock().push((model.to_string(), messages.len()));
            let response = self.response.lock().clone();
            for word in response.split_inclusive(' ') {
                let _ = tokens.send(word.to_string()).await;
            }
            Ok(ChatCompletion { content: response, cost: self.cost_per_call })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLlmClient;

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;

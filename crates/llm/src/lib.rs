//! OpenAI-compatible chat-completions client with native tool calling.
//!
//! The conversation engine only depends on the [`ChatModel`] trait; the
//! concrete [`OpenAiCompatClient`] speaks the `/chat/completions` wire format
//! shared by OpenAI, OpenRouter and Ollama's `/v1` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

mod message;

pub use message::{ChatMessage, FunctionCall, Role, ToolCall};

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model API response contained no choices")]
    EmptyResponse,
}

// ── Response ─────────────────────────────────────────────────────────────────

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    ToolCalls,
    Length,
    ContentFilter,
    #[serde(other)]
    Other,
}

/// A single assistant turn returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub finish_reason: FinishReason,
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Convenience constructor for a plain text answer.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            finish_reason: FinishReason::Stop,
            message: ChatMessage::assistant(content),
        }
    }

    /// Convenience constructor for a tool-call round.
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            finish_reason: FinishReason::ToolCalls,
            message: ChatMessage::assistant_tool_calls(calls),
        }
    }

    /// `true` when the model asked for at least one tool invocation.
    ///
    /// Some OpenAI-compatible servers report `stop` alongside a populated
    /// `tool_calls` list, so the list itself is authoritative.
    pub fn requests_tools(&self) -> bool {
        !self.message.tool_calls.is_empty()
    }

    pub fn content(&self) -> &str {
        self.message.content.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    finish_reason: Option<FinishReason>,
    message: ChatMessage,
}

impl TryFrom<CompletionBody> for ChatResponse {
    type Error = LlmError;

    fn try_from(body: CompletionBody) -> Result<Self, Self::Error> {
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;
        let finish_reason = match choice.finish_reason {
            Some(reason) => reason,
            None if !choice.message.tool_calls.is_empty() => FinishReason::ToolCalls,
            None => FinishReason::Stop,
        };
        Ok(Self {
            finish_reason,
            message: choice.message,
        })
    }
}

// ── ChatModel trait ──────────────────────────────────────────────────────────

/// Anything that can complete a transcript, optionally offering tools.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// `tools` is the OpenAI `tools` array; an empty array means no tools.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &serde_json::Value,
    ) -> Result<ChatResponse, LlmError>;
}

// ── OpenAI-compatible client ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, model, api_key))
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if api_key.is_none() {
            warn!(%base_url, "no API key configured for model endpoint; requests will be unauthenticated");
        }
        Self {
            client,
            base_url,
            model: model.into(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &serde_json::Value,
    ) -> Result<ChatResponse, LlmError> {
        let mut payload = json!({
            "model": self.model,
            "messages": messages,
        });
        if tools.as_array().is_some_and(|tools| !tools.is_empty()) {
            payload["tools"] = tools.clone();
        }

        let mut request = self.client.post(self.endpoint()).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: CompletionBody = response.json().await?;
        let response = ChatResponse::try_from(body)?;
        debug!(
            model = %self.model,
            finish_reason = ?response.finish_reason,
            tool_calls = response.message.tool_calls.len(),
            "model responded"
        );
        Ok(response)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

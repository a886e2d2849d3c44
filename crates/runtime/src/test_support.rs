use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use persona_llm::{ChatMessage, ChatModel, ChatResponse, LlmError};

/// Replays canned responses in order and records every transcript it is
/// sent.  Running out of responses yields a 503 `LlmError::Status`.
#[derive(Default)]
pub(crate) struct ScriptedModel {
    responses: Mutex<VecDeque<ChatResponse>>,
    transcripts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub(crate) fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            transcripts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn transcripts(&self) -> Vec<Vec<ChatMessage>> {
        self.transcripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &serde_json::Value,
    ) -> Result<ChatResponse, LlmError> {
        self.transcripts.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::Status {
                status: 503,
                body: "script exhausted".to_string(),
            })
    }
}

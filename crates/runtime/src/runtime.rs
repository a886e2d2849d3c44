use std::sync::Arc;

use tracing::{info, instrument};

use persona_config::LlmConfig;
use persona_llm::{ChatMessage, ChatModel};
use persona_profile::Profile;
use persona_tools::ToolRegistry;

use crate::EngineError;
use crate::prompt_builder::build_system_prompt;
use crate::tool_loop::{ToolLoopResult, run_tool_loop};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_tool_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for EngineConfig {
    fn from(llm: &LlmConfig) -> Self {
        Self {
            max_tool_rounds: llm.max_tool_rounds,
        }
    }
}

/// Turns one visitor message plus prior history into the assistant's reply.
///
/// Holds only immutable state, so a single engine can serve concurrent
/// requests behind an `Arc`; each call builds its own transcript.
pub struct ChatEngine {
    profile: Arc<Profile>,
    model: Arc<dyn ChatModel>,
    tools: Arc<ToolRegistry>,
    tools_json: serde_json::Value,
    config: EngineConfig,
}

impl ChatEngine {
    pub fn new(
        profile: Arc<Profile>,
        model: Arc<dyn ChatModel>,
        tools: Arc<ToolRegistry>,
        config: EngineConfig,
    ) -> Self {
        let tools_json = tools.openai_tools_json();
        Self {
            profile,
            model,
            tools,
            tools_json,
            config,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn system_prompt(&self) -> String {
        build_system_prompt(&self.profile)
    }

    /// Reply to `message`.  `history` is the visible conversation so far
    /// (user and assistant turns, oldest first).
    pub async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, EngineError> {
        self.respond(message, history).await.map(|result| result.content)
    }

    /// Like [`Self::chat`] but also reports the tool executions of the turn.
    #[instrument(skip(self, message, history), fields(model = %self.model.model_name(), history_len = history.len(), user_len = message.len()))]
    pub async fn respond(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<ToolLoopResult, EngineError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt()));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(message));

        let result = run_tool_loop(
            self.model.as_ref(),
            &mut messages,
            &self.tools_json,
            &self.tools,
            self.config.max_tool_rounds,
        )
        .await?;

        info!(
            model_calls = result.model_calls,
            tool_calls = result.tool_executions.len(),
            reply_len = result.content.len(),
            "turn complete"
        );
        Ok(result)
    }
}

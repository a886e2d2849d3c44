use persona_llm::LlmError;

/// Everything that can end a conversation turn without a reply.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),
    #[error("malformed arguments for tool {tool}: {source}")]
    ToolArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tool {tool} failed: {message}")]
    Tool { tool: String, message: String },
    #[error("model was still requesting tools after {rounds} rounds")]
    ToolRoundLimit { rounds: usize },
}

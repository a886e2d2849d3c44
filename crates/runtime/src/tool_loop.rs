//! Structured tool calling loop.
//!
//! Sends the transcript with tool definitions to the model, executes any
//! `tool_calls` in the response one after another, feeds each result back
//! as a tool-role message, and repeats until the model answers with text.

use serde_json::json;
use tracing::{debug, info, warn};

use persona_llm::{ChatMessage, ChatModel, FinishReason, ToolCall};
use persona_tools::{ToolError, ToolRegistry};

use crate::EngineError;

/// Result of the structured tool loop: the final assistant text plus every
/// tool execution that happened along the way.
#[derive(Debug, Clone)]
pub struct ToolLoopResult {
    pub content: String,
    pub tool_executions: Vec<ToolExecution>,
    /// Number of model round-trips, including the final text answer.
    pub model_calls: usize,
}

/// Record of a single tool execution within the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecution {
    pub call_id: String,
    pub tool_name: String,
    pub output: serde_json::Value,
}

/// Run the structured tool calling loop.
///
/// 1. Sends `messages` + `tools_json` to the model.
/// 2. If the response contains `tool_calls`, appends the assistant message,
///    then executes each call in order and appends its result.
/// 3. Repeats until the model returns a plain answer.
///
/// A response that still asks for tools after `max_rounds` tool rounds ends
/// the turn with [`EngineError::ToolRoundLimit`].
pub async fn run_tool_loop(
    model: &dyn ChatModel,
    messages: &mut Vec<ChatMessage>,
    tools_json: &serde_json::Value,
    tool_registry: &ToolRegistry,
    max_rounds: usize,
) -> Result<ToolLoopResult, EngineError> {
    let mut all_executions: Vec<ToolExecution> = Vec::new();
    let mut tool_rounds = 0;
    let mut model_calls = 0;

    loop {
        debug!(round = tool_rounds, msg_count = messages.len(), "tool loop iteration");

        let response = model.complete(messages, tools_json).await?;
        model_calls += 1;

        if !response.requests_tools() {
            if response.finish_reason == FinishReason::ToolCalls {
                warn!("model reported tool_calls without any calls; treating as final answer");
            }
            return Ok(ToolLoopResult {
                content: response.content().to_string(),
                tool_executions: all_executions,
                model_calls,
            });
        }

        if tool_rounds >= max_rounds {
            warn!(max_rounds, "tool loop hit max rounds");
            return Err(EngineError::ToolRoundLimit { rounds: max_rounds });
        }
        tool_rounds += 1;

        info!(
            round = tool_rounds,
            count = response.message.tool_calls.len(),
            "model requested tool calls"
        );

        // The assistant's tool-call message goes in before any of its results.
        let calls = response.message.tool_calls.clone();
        messages.push(response.message);

        for call in &calls {
            let output = execute_tool_call(call, tool_registry).await?;
            messages.push(ChatMessage::tool_result(&call.id, output.to_string()));
            all_executions.push(ToolExecution {
                call_id: call.id.clone(),
                tool_name: call.function.name.clone(),
                output,
            });
        }
    }
}

/// Resolve and run one tool call.
///
/// Unknown tool names produce an `{"error": ...}` result for the model to see.
/// Arguments that are not valid JSON, or that do not match the tool's
/// parameters, are returned as [`EngineError::ToolArguments`].
async fn execute_tool_call(
    call: &ToolCall,
    registry: &ToolRegistry,
) -> Result<serde_json::Value, EngineError> {
    let tool_name = call.function.name.as_str();
    info!(tool = tool_name, call_id = %call.id, "tool called");

    let Some(tool) = registry.get(tool_name) else {
        warn!(tool = tool_name, "model requested an unknown tool");
        return Ok(json!({ "error": format!("unknown tool: {tool_name}") }));
    };

    let args = parse_arguments(tool_name, &call.function.arguments)?;
    match tool.run(args).await {
        Ok(output) => Ok(output),
        Err(ToolError::InvalidArguments { tool, source }) => {
            Err(EngineError::ToolArguments { tool, source })
        }
        Err(ToolError::Failed(err)) => Err(EngineError::Tool {
            tool: tool_name.to_string(),
            message: format!("{err:#}"),
        }),
    }
}

/// Decode the raw argument text.  Some providers send an empty string for
/// a call without arguments.
fn parse_arguments(tool_name: &str, raw: &str) -> Result<serde_json::Value, EngineError> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw).map_err(|source| EngineError::ToolArguments {
        tool: tool_name.to_string(),
        source,
    })
}

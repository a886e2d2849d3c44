use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use persona_notify::Notifier;

// ── Tool trait and registry ──────────────────────────────────────────────────

/// Describes a single string parameter that a tool accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParam {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ToolParam {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
        }
    }
}

/// Static metadata about a tool, used by the LLM to decide which tool to call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ToolParam>,
}

impl ToolSpec {
    /// Generate the OpenAI-compatible `tools` array element for this tool.
    ///
    /// ```json
    /// {
    ///   "type": "function",
    ///   "function": {
    ///     "name": "record_message",
    ///     "description": "...",
    ///     "parameters": {
    ///       "type": "object",
    ///       "properties": { ... },
    ///       "required": [...],
    ///       "additionalProperties": false
    ///     }
    ///   }
    /// }
    /// ```
    pub fn to_openai_tool_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required: Vec<String> = Vec::new();

        for p in &self.params {
            properties.insert(
                p.name.clone(),
                serde_json::json!({
                    "type": "string",
                    "description": p.description,
                }),
            );
            if p.required {
                required.push(p.name.clone());
            }
        }

        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false,
                }
            }
        })
    }
}

/// Convert a slice of `ToolSpec` into the `tools` JSON array accepted by
/// `/chat/completions`.
pub fn specs_to_openai_tools(specs: &[ToolSpec]) -> serde_json::Value {
    serde_json::Value::Array(specs.iter().map(|s| s.to_openai_tool_schema()).collect())
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Decode a tool's JSON arguments into its typed argument struct.
pub fn parse_args<T: DeserializeOwned>(
    tool: &str,
    args: serde_json::Value,
) -> std::result::Result<T, ToolError> {
    serde_json::from_value(args).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

/// Trait implemented by every tool.
///
/// `run` returns the JSON value that is serialized into the tool-role
/// message handed back to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;
    async fn run(&self, args: serde_json::Value) -> std::result::Result<serde_json::Value, ToolError>;
}

/// Name-keyed table of the tools offered to the model.  Built once at
/// startup and handed to the engine.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry holding `record_user_details` and `record_message`.
    pub fn with_builtins(notifier: Arc<dyn Notifier>) -> Self {
        let mut registry = Self::default();
        // Names are distinct constants; registration cannot collide.
        for tool in builtins::all(notifier) {
            let _ = registry.register(tool);
        }
        registry
    }

    /// Add a tool.  Names must be unique.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.spec().name;
        if self.get(&name).is_some() {
            bail!("tool already registered: {name}");
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn list_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.spec().name == name)
            .map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The `tools` array for every registered tool, in registration order.
    pub fn openai_tools_json(&self) -> serde_json::Value {
        specs_to_openai_tools(&self.list_specs())
    }
}

// ── Built-in tools ───────────────────────────────────────────────────────────

pub mod builtins;
pub use builtins::{RECORD_MESSAGE, RECORD_USER_DETAILS, RecordMessageTool, RecordUserDetailsTool};

// ── Tests ────────────────────────────────────────────────────────────────────

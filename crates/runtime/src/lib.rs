mod error;
pub mod history;
pub mod prompt_builder;
mod runtime;
pub mod tool_loop;

#[cfg(test)]
mod test_support;

pub use error::EngineError;
pub use history::ChatSession;
pub use prompt_builder::{build_system_prompt, opening_message};
pub use runtime::{ChatEngine, EngineConfig};
pub use tool_loop::{ToolExecution, ToolLoopResult};

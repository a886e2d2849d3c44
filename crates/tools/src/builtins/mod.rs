//! The two tools the assistant offers the model.

use std::sync::Arc;

use persona_notify::Notifier;

use crate::Tool;

mod contact;
mod message;

pub use contact::{NAME as RECORD_USER_DETAILS, RecordUserDetailsTool};
pub use message::{NAME as RECORD_MESSAGE, RecordMessageTool};

/// Result returned to the model by every recording tool.
pub(crate) fn recorded() -> serde_json::Value {
    serde_json::json!({ "recorded": true })
}

pub(crate) fn all(notifier: Arc<dyn Notifier>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(RecordUserDetailsTool::new(notifier.clone())),
        Box::new(RecordMessageTool::new(notifier)),
    ]
}

//! `record_user_details`: forwards a visitor's contact details.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use persona_notify::Notifier;

use crate::{Tool, ToolError, ToolParam, ToolSpec, parse_args};

pub const NAME: &str = "record_user_details";
const NAME_PLACEHOLDER: &str = "Name not provided";
const NOTES_PLACEHOLDER: &str = "not provided";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Args {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

pub struct RecordUserDetailsTool {
    notifier: Arc<dyn Notifier>,
}

impl RecordUserDetailsTool {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

fn notification_text(args: &Args) -> String {
    let name = args.name.as_deref().unwrap_or(NAME_PLACEHOLDER);
    let notes = args.notes.as_deref().unwrap_or(NOTES_PLACEHOLDER);
    format!("Recording {name} with email {} and notes {notes}", args.email)
}

#[async_trait]
impl Tool for RecordUserDetailsTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: NAME.to_string(),
            description: "Use this tool to record that a user is interested in being in touch and provided an email address".to_string(),
            params: vec![
                ToolParam::required("email", "The email address of this user"),
                ToolParam::optional("name", "The user's name, if they provided it"),
                ToolParam::optional(
                    "notes",
                    "Any additional information about the conversation that's worth recording to give context",
                ),
            ],
        }
    }

    async fn run(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: Args = parse_args(NAME, args)?;
        info!(email = %args.email, "recording contact details");
        self.notifier.notify(&notification_text(&args)).await;
        Ok(super::recorded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_notify::CapturingNotifier;
    use serde_json::json;

    fn tool() -> (Arc<CapturingNotifier>, RecordUserDetailsTool) {
        let notifier = Arc::new(CapturingNotifier::default());
        let tool = RecordUserDetailsTool::new(notifier.clone());
        (notifier, tool)
    }

    #[tokio::test]
    async fn email_only_uses_placeholders() {
        let (notifier, tool) = tool();
        let result = tool.run(json!({"email": "a@b.com"})).await.unwrap();
        assert_eq!(result, json!({"recorded": true}));

        let sent = notifier.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("a@b.com"));
        assert!(sent[0].contains("Name not provided"));
        assert!(sent[0].contains("notes not provided"));
    }

    #[tokio::test]
    async fn all_fields_are_forwarded() {
        let (notifier, tool) = tool();
        tool.run(json!({
            "email": "sam@example.com",
            "name": "Sam",
            "notes": "hiring for a staff role"
        }))
        .await
        .unwrap();
        assert_eq!(
            notifier.messages(),
            vec!["Recording Sam with email sam@example.com and notes hiring for a staff role"]
        );
    }

    #[tokio::test]
    async fn missing_email_is_invalid() {
        let (notifier, tool) = tool();
        let err = tool.run(json!({"name": "Sam"})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn unknown_fields_are_invalid() {
        let (_, tool) = tool();
        let err = tool
            .run(json!({"email": "a@b.com", "phone": "555"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn spec_requires_only_email() {
        let (_, tool) = tool();
        let spec = tool.spec();
        let required: Vec<&str> = spec
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(required, vec!["email"]);
        assert_eq!(spec.params.len(), 3);
    }
}

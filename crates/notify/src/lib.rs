//! Fire-and-forget push notifications.
//!
//! A [`Notifier`] never reports failure to its caller: transport errors and
//! non-success statuses are logged and swallowed so a broken notification
//! channel cannot abort a conversation.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use persona_config::{NotifyConfig, PushoverCredentials};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str);
}

// ── Pushover ─────────────────────────────────────────────────────────────────

/// Posts `token`, `user` and `message` form fields to a Pushover-style
/// endpoint.
pub struct PushoverNotifier {
    client: reqwest::Client,
    endpoint: String,
    credentials: PushoverCredentials,
}

impl PushoverNotifier {
    pub fn new(config: &NotifyConfig, credentials: PushoverCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|err| {
                warn!(?err, "failed to build notifier HTTP client; using defaults");
                reqwest::Client::new()
            });
        if !credentials.is_complete() {
            warn!("PUSHOVER_TOKEN or PUSHOVER_USER is not set; notifications will be rejected");
        }
        Self {
            client,
            endpoint: config.endpoint.clone(),
            credentials,
        }
    }

    fn form<'a>(&'a self, text: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut form = Vec::with_capacity(3);
        if let Some(token) = &self.credentials.token {
            form.push(("token", token.as_str()));
        }
        if let Some(user) = &self.credentials.user {
            form.push(("user", user.as_str()));
        }
        form.push(("message", text));
        form
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, text: &str) {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&self.form(text))
            .send()
            .await;

        match response {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                info!(text, "push notification sent");
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(%status, %body, "push notification rejected");
            }
            Err(err) => {
                warn!(error = %err, "push notification failed");
            }
        }
    }
}

// ── Log-only ─────────────────────────────────────────────────────────────────

/// Writes notifications to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        info!(text, "notification (not sent)");
    }
}

// ── In-memory ────────────────────────────────────────────────────────────────

/// Keeps every notification in memory, in order.
#[derive(Debug, Default)]
pub struct CapturingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CapturingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn notify(&self, text: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(text.to_string());
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

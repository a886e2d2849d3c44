use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

// ── Provider ─────────────────────────────────────────────────────────────────

/// Which OpenAI-compatible endpoint the assistant talks to.
///
/// | Provider     | Default base URL                 | API key env var      |
/// |--------------|----------------------------------|----------------------|
/// | `openai`     | `https://api.openai.com/v1`      | `OPENAI_API_KEY`     |
/// | `openrouter` | `https://openrouter.ai/api/v1`   | `OPENROUTER_API_KEY` |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    OpenRouter,
}

impl LlmProvider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Display name of the person the assistant speaks for.
    pub name: String,
    /// Plain-text summary written by the person.
    pub summary_path: PathBuf,
    /// Résumé document.  `.pdf` files have their page text extracted; any
    /// other extension is read as UTF-8 text.
    pub resume_path: PathBuf,
    /// Page title for the web chat.  Empty means "{name} - AI Assistant".
    pub title: String,
    /// One-line description shown under the title.  Empty means a generic
    /// description built from `name`.
    pub description: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: "Blair Pattison".to_string(),
            summary_path: PathBuf::from("me/summary.txt"),
            resume_path: PathBuf::from("me/linkedin.pdf"),
            title: String::new(),
            description: String::new(),
        }
    }
}

impl PersonaConfig {
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            format!("{} - AI Assistant", self.name)
        } else {
            self.title.clone()
        }
    }

    pub fn display_description(&self) -> String {
        if self.description.trim().is_empty() {
            format!(
                "Chat with {}'s AI assistant to learn about their background, experience, and career.",
                self.name
            )
        } else {
            self.description.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// Overrides the provider's default base URL.  The `OPENAI_BASE_URL`
    /// environment variable takes precedence when set.
    pub base_url: String,
    /// Hard cap on model round-trips that end in tool calls before a turn is
    /// abandoned.
    pub max_tool_rounds: usize,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            model: "gpt-4o-mini".to_string(),
            base_url: String::new(),
            max_tool_rounds: 8,
            request_timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn effective_base_url(&self) -> &str {
        if self.base_url.trim().is_empty() {
            self.provider.default_base_url()
        } else {
            self.base_url.trim_end_matches('/')
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// When `false` notifications are only written to the log.
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.pushover.net/1/messages.json".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7860".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// ── Secrets ──────────────────────────────────────────────────────────────────

/// Credentials for the push-notification service.  Never written to disk;
/// read from `PUSHOVER_TOKEN` / `PUSHOVER_USER`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PushoverCredentials {
    pub token: Option<String>,
    pub user: Option<String>,
}

impl PushoverCredentials {
    pub fn from_env() -> Self {
        Self {
            token: non_empty_env("PUSHOVER_TOKEN"),
            user: non_empty_env("PUSHOVER_USER"),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

impl std::fmt::Debug for PushoverCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverCredentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

// ── AppConfig ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub persona: PersonaConfig,
    pub llm: LlmConfig,
    pub notify: NotifyConfig,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load config from `path`, falling back to defaults when the file does
    /// not exist, then apply environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)
                .with_context(|| format!("parse config {}", path.display()))?;
        }

        if let Some(name) = non_empty_env("PERSONA_NAME") {
            config.persona.name = name;
        }
        if let Some(model) = non_empty_env("PERSONA_MODEL") {
            config.llm.model = model;
        }
        if let Some(base_url) = non_empty_env("OPENAI_BASE_URL") {
            config.llm.base_url = base_url;
        }
        if let Some(bind) = non_empty_env("PERSONA_BIND") {
            config.server.bind = bind;
        }

        // Every turn needs at least one round for record_message.
        if config.llm.max_tool_rounds == 0 {
            bail!(
                "{}: llm.max_tool_rounds must be at least 1",
                path.display()
            );
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// API key for the configured provider, if present in the environment.
    pub fn llm_api_key(&self) -> Option<String> {
        non_empty_env(self.llm.provider.api_key_env())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    /// `load_from` reads process-wide env vars; tests that call it hold this.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.persona.name, "Blair Pattison");
        assert_eq!(cfg.persona.resume_path, PathBuf::from("me/linkedin.pdf"));
        assert_eq!(cfg.persona.summary_path, PathBuf::from("me/summary.txt"));
        assert_eq!(cfg.llm.provider, LlmProvider::OpenAi);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.max_tool_rounds, 8);
        assert!(cfg.notify.enabled);
        assert_eq!(cfg.notify.endpoint, "https://api.pushover.net/1/messages.json");
        assert_eq!(cfg.server.bind, "127.0.0.1:7860");
        assert_eq!(cfg.telemetry.log_level, "info");
    }

    #[test]
    fn tool_round_cap_is_never_zero_by_default() {
        assert!(LlmConfig::default().max_tool_rounds > 0);
    }

    // ── load_from ──────────────────────────────────────────────────────────

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let _env = env_lock();
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.server.bind, "127.0.0.1:7860");
    }

    #[test]
    fn load_from_valid_toml() {
        let _env = env_lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.toml");
        fs::write(
            &path,
            r#"
[persona]
name = "Ada Lovelace"
summary_path = "/data/summary.txt"
resume_path = "/data/resume.txt"
title = "Ada's Assistant"

[llm]
provider = "openrouter"
model = "openai/gpt-4.1-mini"
max_tool_rounds = 3

[notify]
enabled = false
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.persona.name, "Ada Lovelace");
        assert_eq!(cfg.persona.summary_path, PathBuf::from("/data/summary.txt"));
        assert_eq!(cfg.persona.resume_path, PathBuf::from("/data/resume.txt"));
        assert_eq!(cfg.persona.display_title(), "Ada's Assistant");
        assert_eq!(cfg.llm.provider, LlmProvider::OpenRouter);
        assert_eq!(cfg.llm.model, "openai/gpt-4.1-mini");
        assert_eq!(cfg.llm.max_tool_rounds, 3);
        assert!(!cfg.notify.enabled);
        // Unspecified sections keep their defaults
        assert_eq!(cfg.telemetry.log_level, "info");
        assert_eq!(cfg.llm.request_timeout_secs, 60);
    }

    #[test]
    fn load_from_invalid_toml_returns_error() {
        let _env = env_lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn load_from_rejects_zero_tool_rounds() {
        let _env = env_lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zero.toml");
        fs::write(&path, "[llm]\nmax_tool_rounds = 0\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("max_tool_rounds"));
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let _env = env_lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub/config.toml");

        let mut cfg = AppConfig::default();
        cfg.persona.name = "RoundTrip".to_string();
        cfg.llm.provider = LlmProvider::OpenRouter;
        cfg.llm.max_tool_rounds = 2;

        cfg.save_to(&path).unwrap();
        assert!(path.exists());

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.persona.name, "RoundTrip");
        assert_eq!(loaded.llm.provider, LlmProvider::OpenRouter);
        assert_eq!(loaded.llm.max_tool_rounds, 2);
    }

    // ── derived values ─────────────────────────────────────────────────────

    #[test]
    fn display_title_and_description_fall_back_to_name() {
        let persona = PersonaConfig {
            name: "Sam".to_string(),
            ..Default::default()
        };
        assert_eq!(persona.display_title(), "Sam - AI Assistant");
        assert!(persona.display_description().contains("Sam's AI assistant"));
    }

    #[test]
    fn effective_base_url_per_provider() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.effective_base_url(), "https://api.openai.com/v1");
        llm.provider = LlmProvider::OpenRouter;
        assert_eq!(llm.effective_base_url(), "https://openrouter.ai/api/v1");
        llm.base_url = "http://localhost:11434/v1/".to_string();
        assert_eq!(llm.effective_base_url(), "http://localhost:11434/v1");
    }

    #[test]
    fn provider_serde_labels() {
        for (provider, label) in [
            (LlmProvider::OpenAi, "\"openai\""),
            (LlmProvider::OpenRouter, "\"openrouter\""),
        ] {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, label);
            let back: LlmProvider = serde_json::from_str(&json).unwrap();
            assert_eq!(back, provider);
        }
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let creds = PushoverCredentials {
            token: Some("tok-123".to_string()),
            user: None,
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("tok-123"));
        assert!(rendered.contains("<redacted>"));
        assert!(!creds.is_complete());
    }

    // ── Env var overrides ──────────────────────────────────────────────────

    #[test]
    fn env_overrides_take_precedence() {
        let _env = env_lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("env.toml");
        fs::write(
            &path,
            r#"
[persona]
name = "From File"

[server]
bind = "0.0.0.0:1"
"#,
        )
        .unwrap();

        // SAFETY: every test that reads these vars holds ENV_LOCK.
        unsafe {
            env::set_var("PERSONA_NAME", "From Env");
            env::set_var("PERSONA_BIND", "0.0.0.0:8080");
        }
        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.persona.name, "From Env");
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        unsafe {
            env::remove_var("PERSONA_NAME");
            env::remove_var("PERSONA_BIND");
        }
    }
}

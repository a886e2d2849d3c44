use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use persona_config::{AppConfig, PushoverCredentials};
use persona_llm::OpenAiCompatClient;
use persona_notify::{LogNotifier, Notifier, PushoverNotifier};
use persona_profile::Profile;
use persona_runtime::{ChatEngine, EngineConfig, opening_message};
use persona_tools::ToolRegistry;
use persona_web::PageInfo;

pub(crate) fn build_notifier(config: &AppConfig, dry_run: bool) -> Arc<dyn Notifier> {
    if dry_run || !config.notify.enabled {
        info!("notifications go to the log only");
        return Arc::new(LogNotifier);
    }
    Arc::new(PushoverNotifier::new(
        &config.notify,
        PushoverCredentials::from_env(),
    ))
}

pub(crate) fn load_profile(config: &AppConfig) -> Result<Profile> {
    Profile::load(&config.persona).with_context(|| {
        format!(
            "load profile documents for {} ({}, {})",
            config.persona.name,
            config.persona.summary_path.display(),
            config.persona.resume_path.display()
        )
    })
}

pub(crate) fn build_engine(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Result<ChatEngine> {
    let profile = load_profile(config)?;

    let model = OpenAiCompatClient::new(
        config.llm.effective_base_url(),
        config.llm.model.clone(),
        config.llm_api_key(),
        Duration::from_secs(config.llm.request_timeout_secs),
    )
    .context("build model client")?;

    let tools = ToolRegistry::with_builtins(notifier);
    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        tools = tools.len(),
        "engine ready"
    );

    Ok(ChatEngine::new(
        Arc::new(profile),
        Arc::new(model),
        Arc::new(tools),
        EngineConfig::from(&config.llm),
    ))
}

pub(crate) fn page_info(config: &AppConfig) -> PageInfo {
    PageInfo {
        name: config.persona.name.clone(),
        title: config.persona.display_title(),
        description: config.persona.display_description(),
        opening_message: opening_message(&config.persona.name),
    }
}

mod app;
mod chat;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use persona_config::{AppConfig, DEFAULT_CONFIG_PATH};
use persona_runtime::build_system_prompt;
use persona_web::AppState;

#[derive(Debug, Parser)]
#[command(
    name = "persona",
    version,
    about = "An AI assistant that answers on someone's behalf from their résumé"
)]
struct Cli {
    /// Config file to read (missing file means built-in defaults).
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Write notifications to the log instead of sending them.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the browser chat UI (default).
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:7860.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Chat in the terminal.
    Chat,
    /// Print the generated system prompt.
    Prompt,
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Send one notification through the configured channel.
    NotifyTest {
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let notifier = app::build_notifier(&config, cli.dry_run);
            let engine = app::build_engine(&config, notifier)?;
            let state = AppState::new(Arc::new(engine), app::page_info(&config));
            let addr = bind.unwrap_or_else(|| config.server.bind.clone());
            persona_web::serve(state, &addr).await?;
        }
        Commands::Chat => {
            let notifier = app::build_notifier(&config, cli.dry_run);
            let engine = app::build_engine(&config, notifier)?;
            let page = app::page_info(&config);
            chat::run_terminal_chat(&engine, &page.opening_message).await?;
        }
        Commands::Prompt => {
            let profile = app::load_profile(&config)?;
            println!("{}", build_system_prompt(&profile));
        }
        Commands::Init { force } => {
            write_default_config(&cli.config, force)?;
            println!("wrote {}", cli.config.display());
        }
        Commands::NotifyTest { text } => {
            let notifier = app::build_notifier(&config, cli.dry_run);
            notifier.notify(&text).await;
            println!("notification dispatched (see log for delivery status)");
        }
    }

    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default().save_to(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["persona"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!cli.dry_run);
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::parse_from(["persona", "notify-test", "hello", "--dry-run", "--config", "alt.toml"]);
        assert!(cli.dry_run);
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert!(matches!(cli.command, Some(Commands::NotifyTest { text }) if text == "hello"));
    }

    #[test]
    fn serve_accepts_bind_override() {
        let cli = Cli::parse_from(["persona", "serve", "--bind", "0.0.0.0:9000"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Serve { bind: Some(addr) }) if addr == "0.0.0.0:9000"
        ));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("default.toml");

        write_default_config(&path, false).unwrap();
        let written = AppConfig::load_from(&path).unwrap();
        assert_eq!(written.llm.max_tool_rounds, 8);

        assert!(write_default_config(&path, false).is_err());
        write_default_config(&path, true).unwrap();
    }
}

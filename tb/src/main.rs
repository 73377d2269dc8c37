//! Timebox - daily planner with ranked top priorities
//!
//! CLI entry point for the planner shell and settings management.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use settingstore::{FileStore, KvStore};
use tracing::info;

use timebox::cli::{Cli, Command, PromptCommand, SettingsCommand};
use timebox::config::Config;
use timebox::llm::Provider;
use timebox::repl;
use timebox::settings::Settings;

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timebox")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to log file, not stdout/stderr, so the shell output stays clean
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("timebox.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let settings_path = config.storage.expanded_settings_path();
    let store = FileStore::open(&settings_path).context("Failed to open settings store")?;
    let settings = Settings::load(store).context("Failed to load settings")?;

    info!(
        "Timebox loaded config: slots={}, settings={}",
        config.planner.slots,
        settings_path.display()
    );

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => repl::run_interactive(&config, settings).await,
        Command::Settings { command } => cmd_settings(&config, settings, command),
    }
}

/// Handle `tb settings ...`
fn cmd_settings<S: KvStore>(config: &Config, mut settings: Settings<S>, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => print_settings(config, &settings),
        SettingsCommand::SetKey { provider, key } => {
            settings.set_api_key(provider, &key)?;
            if key.trim().is_empty() {
                println!("Cleared {} API key", provider.display_name());
            } else {
                println!("Saved {} API key", provider.display_name());
            }
        }
        SettingsCommand::Provider { provider } => {
            settings.set_provider(provider)?;
            println!("AI Magic will use {}", provider.display_name());
        }
        SettingsCommand::Ai { state } => {
            settings.set_ai_enabled(state.enabled())?;
            println!("AI features {}", if state.enabled() { "enabled" } else { "disabled" });
        }
        SettingsCommand::Hours { start, end } => {
            settings.set_day_hours(start, end)?;
            println!("Day runs {}:00 - {}:00", start, end);
        }
        SettingsCommand::TimeFormat { format } => {
            settings.set_time_format(format)?;
            println!("Time format set to {}", format);
        }
        SettingsCommand::Theme { name } => {
            settings.set_theme(&name)?;
            println!("Theme set to {}", settings.theme());
        }
        SettingsCommand::Prompt { command } => cmd_prompt(&mut settings, command)?,
    }
    Ok(())
}

/// Handle `tb settings prompt ...`
fn cmd_prompt<S: KvStore>(settings: &mut Settings<S>, command: PromptCommand) -> Result<()> {
    match command {
        PromptCommand::Show => print_prompts(settings),
        PromptCommand::Set { text } => {
            settings.set_active_prompt(&text)?;
            if !settings.active_prompt().has_placeholder() {
                println!(
                    "{} Prompt has no {{TASK_TEXT}} placeholder; the task will be appended to it.",
                    "!".yellow()
                );
            }
            println!("Prompt activated");
        }
        PromptCommand::Use { index } => {
            let prompt = history_entry(settings, index)?;
            settings.set_active_prompt(&prompt)?;
            println!("Prompt #{} activated", index);
        }
        PromptCommand::Delete { index } => {
            let prompt = history_entry(settings, index)?;
            settings.delete_prompt(&prompt)?;
            println!("Prompt #{} deleted", index);
        }
        PromptCommand::Reset => {
            settings.reset_prompt()?;
            println!("Default prompt activated");
        }
    }
    Ok(())
}

fn history_entry<S: KvStore>(settings: &Settings<S>, index: usize) -> Result<String> {
    index
        .checked_sub(1)
        .and_then(|i| settings.prompt_history().get(i))
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| eyre::eyre!("No prompt #{} (history has {})", index, settings.prompt_history().len()))
}

fn print_settings<S: KvStore>(config: &Config, settings: &Settings<S>) {
    println!("{}", "Settings".bright_cyan().bold());
    println!("  {:16} {}", "theme", settings.theme());
    println!("  {:16} {}:00 - {}:00", "day", settings.day_start(), settings.day_end());
    println!("  {:16} {}", "time format", settings.time_format());
    println!("  {:16} {}", "ai", if settings.ai_enabled() { "on" } else { "off" });
    println!("  {:16} {}", "provider", settings.provider().display_name());
    for provider in [Provider::Gemini, Provider::OpenAI] {
        let resolved = config.llm.resolve(provider);
        let key = match settings.api_key(provider) {
            Some(key) => mask(key),
            None if resolved.env_api_key().is_some() => format!("(from ${})", resolved.api_key_env),
            None => "(not set)".dimmed().to_string(),
        };
        println!("  {:16} {}", format!("{} key", provider.as_str()), key);
    }
    println!();
    print_prompts(settings);
}

fn print_prompts<S: KvStore>(settings: &Settings<S>) {
    println!("{}", "Prompt History".bright_cyan().bold());
    for (i, prompt) in settings.prompt_history().iter().enumerate() {
        let marker = if prompt == settings.active_prompt() {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        let first_line = prompt.as_str().lines().next().unwrap_or_default();
        let preview: String = first_line.chars().take(70).collect();
        let ellipsis = if prompt.as_str().chars().count() > preview.chars().count() { "..." } else { "" };
        println!(" {} {}. {}{}", marker, i + 1, preview, ellipsis);
    }
}

fn mask(key: &str) -> String {
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", tail)
}

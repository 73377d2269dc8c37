//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::llm::Provider;
use crate::settings::TimeFormat;

/// Timebox - daily planner with top priorities and AI Magic
#[derive(Parser)]
#[command(
    name = "tb",
    about = "Daily planner with ranked top priorities and AI task refinement",
    version,
    after_help = "Logs are written to: ~/.local/share/timebox/logs/timebox.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `shell`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Start the interactive planner shell
    Shell,

    /// View or change persisted preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// `tb settings` subcommands
#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print every preference (API keys masked)
    Show,

    /// Store an API key; pass an empty string to clear it
    SetKey {
        /// gemini or openai
        provider: Provider,

        key: String,
    },

    /// Choose the AI provider used by AI Magic
    Provider { provider: Provider },

    /// Turn AI features on or off
    Ai { state: Switch },

    /// Set the visible day window
    Hours { start: u8, end: u8 },

    /// Set the clock format (12h or 24h)
    TimeFormat { format: TimeFormat },

    /// Set the theme (Default, Forest, Ocean, Sunset, Monochrome)
    Theme { name: String },

    /// Manage the refinement prompt and its history
    Prompt {
        #[command(subcommand)]
        command: PromptCommand,
    },
}

/// `tb settings prompt` subcommands
#[derive(Subcommand)]
pub enum PromptCommand {
    /// Show the active prompt and the history
    Show,

    /// Activate a prompt (use {TASK_TEXT} where the task goes)
    Set { text: String },

    /// Re-activate a history entry by its number
    Use { index: usize },

    /// Delete a history entry by its number
    Delete { index: usize },

    /// Re-activate the built-in prompt
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        self == Switch::On
    }
}

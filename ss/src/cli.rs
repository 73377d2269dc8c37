//! CLI argument parsing for settingstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ss")]
#[command(author, version, about = "Inspect and edit timebox settings", long_about = None)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a value
    Get {
        /// Key to read
        #[arg(required = true)]
        key: String,
    },

    /// Set a value
    Set {
        /// Key to write
        #[arg(required = true)]
        key: String,

        /// New value
        #[arg(required = true)]
        value: String,
    },

    /// Remove a value
    Unset {
        /// Key to remove
        #[arg(required = true)]
        key: String,
    },

    /// List all keys and values
    List {
        /// Show credential values instead of masking them
        #[arg(long)]
        reveal: bool,
    },
}

/// Whether a key holds a secret that `list` should mask
pub fn is_secret_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.contains("apikey") || lower.contains("api-key") || lower.contains("api_key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_secret_key() {
        assert!(is_secret_key("geminiApiKey"));
        assert!(is_secret_key("openai-api-key"));
        assert!(!is_secret_key("theme"));
    }
}

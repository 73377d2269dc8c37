use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use settingstore::cli::{Cli, Command, is_secret_key};
use settingstore::{FileStore, KvStore};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let path = cli.store.unwrap_or_else(settingstore::default_store_path);
    let mut store = FileStore::open(&path).context("Failed to open settings store")?;

    info!("settingstore using {}", path.display());

    match cli.command {
        Command::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("{} No value for key: {}", "✗".red(), key);
                std::process::exit(1);
            }
        },
        Command::Set { key, value } => {
            store.set(&key, &value)?;
            println!("{} Set {}", "✓".green(), key.cyan());
        }
        Command::Unset { key } => {
            if store.remove(&key)? {
                println!("{} Removed {}", "✓".green(), key.cyan());
            } else {
                println!("No value for key: {}", key);
            }
        }
        Command::List { reveal } => {
            let keys = store.keys()?;
            if keys.is_empty() {
                println!("No settings stored in {}", path.display());
            }
            for key in keys {
                let value = store.get(&key)?.unwrap_or_default();
                let shown = if is_secret_key(&key) && !reveal && !value.is_empty() {
                    "********".to_string()
                } else {
                    value
                };
                println!("{} = {}", key.yellow(), shown);
            }
        }
    }

    Ok(())
}

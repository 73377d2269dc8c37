//! Interactive planner shell
//!
//! Reads commands with line editing and renders the priorities and backlog
//! after each change. Tasks live only for the session.

mod command;
mod session;

pub use command::ShellCommand;
pub use session::{ReplSession, ShellResult};

use eyre::Result;
use settingstore::KvStore;

use crate::config::Config;
use crate::settings::Settings;

/// Run the interactive shell
///
/// This is the main entry point for `tb shell`.
pub async fn run_interactive<S: KvStore>(config: &Config, settings: Settings<S>) -> Result<()> {
    let mut session = ReplSession::new(config.clone(), settings);
    session.run().await
}

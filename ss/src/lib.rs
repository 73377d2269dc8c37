//! SettingStore - small persistent key-value store
//!
//! Holds string-keyed scalar and small-JSON values (user preferences,
//! credentials, prompt history) for the timebox planner.
//!
//! # Layout
//!
//! ```text
//! ~/.local/share/timebox/
//! └── settings.json    # one flat JSON object: { "key": "value", ... }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use settingstore::{FileStore, KvStore};
//!
//! let mut store = FileStore::open(settingstore::default_store_path())?;
//! store.set("theme", "Default")?;
//! assert_eq!(store.get("theme")?.as_deref(), Some("Default"));
//! ```

pub mod cli;
mod store;

pub use store::{FileStore, KvStore, MemoryStore};

use std::path::PathBuf;

/// Default store location (`~/.local/share/timebox/settings.json`)
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timebox")
        .join("settings.json")
}

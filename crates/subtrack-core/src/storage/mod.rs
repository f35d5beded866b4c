mod config;
pub mod kv;
pub mod migrations;
pub mod subscriptions;

pub use config::{AlertsConfig, Config, ExportConfig, StorageConfig};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use subscriptions::SubscriptionStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the directory holding the config file and the subscription slot.
///
/// `SUBTRACK_DATA_DIR` wins when set. Otherwise `~/.config/subtrack[-dev]/`,
/// picked by `SUBTRACK_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("SUBTRACK_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SUBTRACK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("subtrack-dev")
            } else {
                base_dir.join("subtrack")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

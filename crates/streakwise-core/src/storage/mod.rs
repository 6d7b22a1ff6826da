mod config;
pub mod database;
pub mod migrations;

pub use config::{CalendarConfig, Config, UiConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// Returns the Streakwise data directory, creating it if needed.
///
/// `STREAKWISE_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/streakwise[-dev]/`, with the `-dev` suffix selected by
/// `STREAKWISE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("STREAKWISE_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .ok_or_else(|| StorageError::DataDirUnavailable("no home directory".into()))?
                .join(".config");
            let env = std::env::var("STREAKWISE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("streakwise-dev")
            } else {
                base_dir.join("streakwise")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

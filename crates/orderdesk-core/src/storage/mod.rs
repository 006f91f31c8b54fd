mod config;

pub use config::{ApiConfig, Config, OrdersConfig};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/orderdesk[-dev]/` based on ORDERDESK_ENV.
///
/// Set ORDERDESK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .ok_or_else(|| ConfigError::NoDataDir("home directory not found".into()))?
        .join(".config");

    let env = std::env::var("ORDERDESK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("orderdesk-dev")
    } else {
        base_dir.join("orderdesk")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

//! Centralized path management for usrman

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the usrman config directory
pub fn usrman_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("usrman");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory at {}", config_dir.display()))?;

    Ok(config_dir)
}

/// Get the usrman data directory
pub fn usrman_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("usrman");

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory at {}", data_dir.display()))?;

    Ok(data_dir)
}

/// Default location of the diagnostic log written while the TUI is running
pub fn default_log_file() -> Result<PathBuf> {
    Ok(usrman_data_dir()?.join("usrman.log"))
}

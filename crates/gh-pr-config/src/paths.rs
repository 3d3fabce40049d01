//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate with fallbacks.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/gh-pr-review/`, `~/.cache/gh-pr-review/`
//! - macOS: `~/Library/Application Support/gh-pr-review/`, `~/Library/Caches/gh-pr-review/`
//! - Windows: `%APPDATA%\gh-pr-review\`, `%LOCALAPPDATA%\gh-pr-review\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "gh-pr-review";

/// Get the application config directory
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_NAME))
}

/// Get the application cache directory, creating it if needed
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
    Ok(dir)
}

/// Get path to the default offline snapshot
pub fn snapshot_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("snapshot.json"))
}

//! Application configuration
//!
//! Configuration loaded from .gh-pr-review.toml file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration loaded from .gh-pr-review.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Snapshot file served by the offline client
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,

    /// Drop command completions that were overtaken by a newer request
    /// for the same resource (false = last completion wins)
    #[serde(default = "default_drop_stale_completions")]
    pub drop_stale_completions: bool,

    /// Log every fetched PR as pretty JSON
    #[serde(default)]
    pub print_prs: bool,

    /// Dim timeline events the viewer has already seen
    #[serde(default = "default_dim_known_events")]
    pub dim_known_events: bool,
}

fn default_snapshot_file() -> PathBuf {
    crate::paths::snapshot_path().unwrap_or_else(|_| PathBuf::from("snapshot.json"))
}

fn default_drop_stale_completions() -> bool {
    true
}

fn default_dim_known_events() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
            drop_stale_completions: default_drop_stale_completions(),
            print_prs: false,
            dim_known_events: default_dim_known_events(),
        }
    }
}

impl AppConfig {
    /// Load the first config file found, or use defaults
    pub fn load() -> Self {
        if let Some((path, content)) = crate::load_config_file() {
            match Self::parse(&content) {
                Ok(config) => {
                    log::info!("Loaded app config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                }
            }
        }

        log::debug!("Using default app config");
        Self::default()
    }

    /// Parse config file content
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

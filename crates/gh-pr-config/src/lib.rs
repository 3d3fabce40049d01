//! Configuration for gh-pr-review
//!
//! - `AppConfig`: settings read from `.gh-pr-review.toml`
//! - `config_file`: where that file is looked up
//! - `paths`: platform config/cache directories

pub mod app_config;
pub mod config_file;
pub mod paths;

pub use app_config::AppConfig;
pub use config_file::{config_candidates, load_config_file};
pub use paths::{cache_dir, config_dir, snapshot_path};

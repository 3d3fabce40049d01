//! Config file discovery
//!
//! Candidates, first readable one wins:
//! 1. `$GH_PR_REVIEW_CONFIG`, when set
//! 2. `./.gh-pr-review.toml`
//! 3. `~/.gh-pr-review.toml`
//! 4. `<config dir>/config.toml`

use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".gh-pr-review.toml";
const CONFIG_ENV: &str = "GH_PR_REVIEW_CONFIG";

/// Paths searched for a config file, in priority order
pub fn config_candidates() -> Vec<PathBuf> {
    candidates_from(
        std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
        crate::paths::config_dir().ok(),
    )
}

fn candidates_from(
    explicit: Option<PathBuf>,
    home: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = explicit.into_iter().collect();
    candidates.push(PathBuf::from(CONFIG_FILE));
    candidates.extend(home.map(|h| h.join(CONFIG_FILE)));
    candidates.extend(config_dir.map(|d| d.join("config.toml")));
    candidates
}

/// Content of the first readable config file, with its path
pub fn load_config_file() -> Option<(PathBuf, String)> {
    first_readable(&config_candidates())
}

fn first_readable(candidates: &[PathBuf]) -> Option<(PathBuf, String)> {
    candidates.iter().find_map(|path| read(path).map(|c| (path.clone(), c)))
}

fn read(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Some(content)
        }
        Err(_) => None,
    }
}

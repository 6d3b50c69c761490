//! Config file loading for the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::types::RestTimerConfig;

/// Default config location: `<config dir>/rest-timer/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rest-timer").join("config.json"))
}

/// Loads the configuration.
///
/// An explicit `path` must exist. Without one the default location is used
/// when present, otherwise built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<RestTimerConfig> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => read_config(&path)?,
            None => {
                debug!("No config file, using defaults");
                RestTimerConfig::default()
            }
        },
    };

    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<RestTimerConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

//! CLI defaults from an optional TOML config file
//!
//! Resolution order: an explicit `--config` path (must exist), then
//! `~/.config/retain/config.toml` if present, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Directory holding the CRM CSV exports
    pub data_dir: Option<PathBuf>,
    /// Trainer scope applied when no --trainer flag is given
    pub default_trainer: Option<String>,
    /// Invite count used for survey response rates when --invited is absent
    pub invited_per_survey: Option<i64>,
    /// Churn rate (percent) above which report assembly logs a warning
    pub churn_warn_threshold: Option<f64>,
}

impl CliConfig {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            return toml::from_str(&raw)
                .with_context(|| format!("Invalid config file {}", path.display()));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("retain").join("config.toml");
            if path.exists() {
                debug!(path = %path.display(), "Loading config");
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                return toml::from_str(&raw)
                    .with_context(|| format!("Invalid config file {}", path.display()));
            }
        }

        Ok(Self::default())
    }
}

//! Application configuration module
//!
//! Settings are stored with `confy`, which picks the OS-specific config
//! directory. Missing fields fall back to their defaults.

use crate::constant::{APP_NAME, DEFAULT_BATCH_SIZE, DEFAULT_LOOKAHEAD_THRESHOLD};
use crate::selection::FullSelectionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Confy(#[from] confy::ConfyError),
}

pub struct Config {
    pub settings: Settings,
}

impl Config {
    /// Load configuration from disk, creating default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = confy::load(APP_NAME, None)?;
        info!("Load config from {:?}", Self::config_path()?);
        Ok(Self { settings })
    }

    /// Save current configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, &self.settings)?;
        info!("Save config to {:?}", Self::config_path()?);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, None)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!("Falling back to default settings: {}", e);
            Self {
                settings: Settings::default(),
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// How close (in layout units) the viewport's trailing edge must get to
    /// the end of the content before the next batch is fetched
    #[serde(default = "default_lookahead_threshold")]
    pub lookahead_threshold: f64,

    /// Revisions requested per page
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// What a tap on a third revision does while two are already selected
    #[serde(default)]
    pub full_selection_policy: FullSelectionPolicy,
}

fn default_lookahead_threshold() -> f64 {
    DEFAULT_LOOKAHEAD_THRESHOLD
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookahead_threshold: DEFAULT_LOOKAHEAD_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            full_selection_policy: FullSelectionPolicy::default(),
        }
    }
}

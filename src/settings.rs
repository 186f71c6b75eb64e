//! Runtime settings
//!
//! Loaded from an optional JSON file. Only scheduling and housekeeping live
//! here; gameplay constants stay fixed in `consts` so replays keep working.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_SKIP;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runner and binary settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catch-up ticks allowed per scheduler iteration
    pub max_frame_skip: u32,
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// JSON file holding the record book; in-memory when unset
    pub records_path: Option<PathBuf>,
    /// Start the loop with the global pause set
    pub start_paused: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_frame_skip: MAX_FRAME_SKIP,
            log_filter: "info".to_string(),
            records_path: None,
            start_paused: false,
        }
    }
}

impl Settings {
    /// Parse settings, rejecting anything that isn't valid JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.max_frame_skip = settings.max_frame_skip.max(1);
        Ok(settings)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings ({}: {})", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

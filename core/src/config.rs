//! Viewer configuration.
//!
//! Stored with `confy` under the `raidlens` app name, or read from an
//! explicit TOML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spell::default_spells_path;

const APP_NAME: &str = "raidlens";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Selection codes shown when none are given explicitly
    pub default_selections: Vec<u32>,
    /// Spell name file; falls back to the user config directory
    pub spells_file: Option<PathBuf>,
    /// Swap `.` and `,` in printed numbers
    pub european_numbers: bool,
    /// Upper bound for one event source fetch; 0 disables the limit
    pub fetch_timeout_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_selections: vec![1],
            spells_file: None,
            european_numbers: false,
            fetch_timeout_ms: 5_000,
        }
    }
}

impl ViewerConfig {
    /// Load the stored configuration, creating it with defaults if missing.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }

    pub fn spells_path(&self) -> Option<PathBuf> {
        self.spells_file.clone().or_else(default_spells_path)
    }
}

//! Snapshot configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `GRAFT_SAVE_DIR`, `GRAFT_FORMAT`, `GRAFT_DENY`
//!    (comma separated type tags)
//! 2. Config file: `graft.toml` in the working directory, or an explicit
//!    path
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! save_dir = "saves"
//! format = "binary"   # json, binary
//! slot = "quicksave"
//! deny_list = ["audio_time_scale", "decal_controller"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filter::{CaptureFilter, DEFAULT_DENY_LIST};
use crate::store::{SnapshotFormat, SnapshotStore};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "graft.toml";

/// Snapshot pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Directory holding snapshot slots
    pub save_dir: PathBuf,
    /// Encoding of stored documents
    pub format: SnapshotFormat,
    /// Behaviour type tags never captured
    pub deny_list: Vec<String>,
    /// Slot used when none is given
    pub slot: String,
    /// File this config was read from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            format: SnapshotFormat::Json,
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
            slot: "quicksave".to_string(),
            config_path: None,
        }
    }
}

impl SnapshotConfig {
    /// Load from `graft.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            log::debug!("No {} found, using defaults", CONFIG_FILE);
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded snapshot config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `GRAFT_*` overrides looked up through `var`
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var("GRAFT_SAVE_DIR").filter(|v| !v.is_empty()) {
            self.save_dir = PathBuf::from(dir);
            log::info!("Save directory from env: {}", self.save_dir.display());
        }

        if let Some(format) = var("GRAFT_FORMAT") {
            self.format = format.parse()?;
            log::info!("Snapshot format from env: {}", self.format);
        }

        if let Some(deny) = var("GRAFT_DENY") {
            self.deny_list = deny
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            log::info!("Deny-list from env: {:?}", self.deny_list);
        }

        Ok(())
    }

    /// Capture filter built from the deny-list
    pub fn filter(&self) -> CaptureFilter {
        CaptureFilter::new(self.deny_list.iter().cloned())
    }

    /// Store rooted at the configured directory and format
    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.save_dir).with_format(self.format)
    }

    /// Log a summary of the effective configuration
    pub fn print_summary(&self) {
        log::info!("Snapshot configuration:");
        log::info!("  Save dir: {} ({})", self.save_dir.display(), self.format);
        log::info!("  Slot: {}", self.slot);
        log::info!("  Deny-list: {:?}", self.deny_list);
        if let Some(path) = &self.config_path {
            log::info!("  Config: {}", path.display());
        }
    }
}

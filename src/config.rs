//! Configuration loading and management
//!
//! Handles parsing of `tasklist.toml` configuration files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::task::Priority;
use crate::view::{SortDirection, SortType, ViewConfig, ViewState};

/// File name of the configuration file inside the config directory
pub const CONFIG_FILENAME: &str = "tasklist.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and how state is stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Initial sort configuration for each view
    #[serde(default)]
    pub view: ViewsConfig,
}

/// What to do when a persisted blob cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptPolicy {
    /// Refuse to start; the error surfaces to the caller
    #[default]
    Fail,
    /// Move the blob aside and start from an empty state
    Reset,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory; platform default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Blob key holding the task collection
    #[serde(default = "default_tasks_key")]
    pub tasks_key: String,

    /// Blob key holding theme and view preferences
    #[serde(default = "default_prefs_key")]
    pub prefs_key: String,

    /// Policy for unreadable persisted state
    #[serde(default)]
    pub on_corrupt: CorruptPolicy,

    /// How long to wait for the data file lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_tasks_key() -> String {
    "todos".to_string()
}

fn default_prefs_key() -> String {
    "prefs".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            tasks_key: default_tasks_key(),
            prefs_key: default_prefs_key(),
            on_corrupt: CorruptPolicy::default(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Task defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Priority used by `add` when none is given
    #[serde(default = "default_priority")]
    pub default_priority: Priority,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
        }
    }
}

/// Initial sort configuration for both views
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewsConfig {
    #[serde(default)]
    pub active: ViewDefaults,

    #[serde(default)]
    pub completed: ViewDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewDefaults {
    #[serde(default = "default_sort_type")]
    pub sort_type: SortType,

    #[serde(default = "default_sort_direction")]
    pub sort_direction: SortDirection,
}

fn default_sort_type() -> SortType {
    SortType::Datetime
}

fn default_sort_direction() -> SortDirection {
    SortDirection::Descending
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            sort_type: default_sort_type(),
            sort_direction: default_sort_direction(),
        }
    }
}

impl From<&ViewDefaults> for ViewConfig {
    fn from(defaults: &ViewDefaults) -> Self {
        ViewConfig {
            sort_type: defaults.sort_type,
            sort_direction: defaults.sort_direction,
        }
    }
}

impl ViewsConfig {
    /// View state used before any preference has been persisted
    pub fn initial_state(&self) -> ViewState {
        ViewState {
            active: ViewConfig::from(&self.active),
            completed: ViewConfig::from(&self.completed),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load configuration from `path` if it exists, or return defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Platform config file location (`<config dir>/tasklist.toml`)
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }

    /// Resolve the data directory: explicit override, config, then platform default
    pub fn resolve_data_dir(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "cannot determine a data directory; pass --data-dir".to_string(),
                )
            })
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        validate_key(&self.tasks_key, "storage.tasks_key")?;
        validate_key(&self.prefs_key, "storage.prefs_key")?;
        if self.tasks_key == self.prefs_key {
            return Err(Error::InvalidConfig(
                "storage.tasks_key and storage.prefs_key must differ".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_key(key: &str, field: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(Error::InvalidConfig(format!(
            "{field}: invalid key '{key}' (expected [A-Za-z0-9_-])"
        )));
    }
    Ok(())
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "tasklist")
}

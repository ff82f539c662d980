//! Tracker configuration loading
//!
//! Loads configuration from `~/.config/parcel-tracker/tracker.toml` (or
//! `PARCEL_TRACKER_CONFIG` env). Every key is optional.

use crate::errors::{Result, StoreError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration for opening the parcel database
#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Apply the bundled schema when the database is opened
    #[serde(default = "default_create_schema")]
    pub create_schema: bool,

    /// How long a connection waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// SQLite journal mode
    #[serde(default)]
    pub journal_mode: JournalMode,
}

fn default_db_path() -> String {
    "tracker.db".to_string()
}

fn default_create_schema() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// SQLite journal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
}

impl JournalMode {
    /// Value for `PRAGMA journal_mode`
    pub fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            create_schema: default_create_schema(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
        }
    }
}

impl TrackerConfig {
    /// Environment variable overriding the config file location
    pub const ENV_CONFIG_PATH: &'static str = "PARCEL_TRACKER_CONFIG";

    /// File name looked up under `~/.config/parcel-tracker/`
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "tracker.toml";

    /// Load configuration from the resolved path, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path_from(
            std::env::var(Self::ENV_CONFIG_PATH).ok(),
            dirs::home_dir(),
        );
        Self::load_resolved(&path)
    }

    /// Load from an already resolved path; a missing file yields defaults.
    pub fn load_resolved(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(
                path = %path.display(),
                "Tracker config not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load_from_path(path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::config_with_source(
                format!("failed to read config at {}", path.display()),
                e,
            )
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: TrackerConfig = toml::from_str(contents)
            .map_err(|e| StoreError::config_with_source("failed to parse config", e))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve the configuration file path from the env override and the
    /// home directory, in that order of precedence.
    pub fn resolve_config_path_from(env: Option<String>, home: Option<PathBuf>) -> PathBuf {
        if let Some(path) = env.filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }

        home.map(|h| {
                h.join(".config")
                    .join("parcel-tracker")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    fn validate(&self) -> Result<()> {
        if self.db_path.trim().is_empty() {
            return Err(StoreError::config("db_path must not be empty"));
        }

        if self.busy_timeout_ms == 0 {
            tracing::warn!("busy_timeout_ms is 0; concurrent writers will fail immediately");
        }

        Ok(())
    }

    /// Get the resolved database path (expanding ~ if needed)
    pub fn resolved_db_path(&self) -> PathBuf {
        let path = &self.db_path;
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(path)
    }
}

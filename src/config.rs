//! Configuration management
//!
//! Config is a TOML file, by default `oslogs.toml` next to the executable.
//! Every section and field is optional; missing values take their defaults.

use crate::constants::{
    DEFAULT_FILE_DESTINATION_FILE, DEFAULT_JSONL_STORE_FILE, DEFAULT_MEMORY_STORE_ENTRIES,
    DEFAULT_TRANSCRIPT_INTERVAL_SECS, FILE_DESTINATION_MAX_BYTES, FILE_DESTINATION_MAX_FILES,
};
use crate::error::{LogsError, Result};
use crate::logging::{DispatchMode, FileDestinationConfig, Severity};
use crate::store::Scope;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config file name
pub const CONFIG_FILE: &str = "oslogs.toml";

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logs: LogsConfig,
    pub dispatch: DispatchConfig,
    pub store: StoreConfig,
    pub destinations: DestinationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Subsystem identifier (unset = detect from the running process)
    pub subsystem: Option<String>,
    /// Trailing window of transcripts (seconds)
    pub default_interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// "queued" (dispatcher thread) or "inline" (caller's thread)
    pub mode: DispatchMode,
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Backend used as the host log store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// In-process ring buffer, lost on exit
    #[default]
    Memory,
    /// Append-only JSON-lines file, shared by every process using it
    Jsonl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// JSON-lines file (jsonl only)
    pub path: PathBuf,
    /// Capacity (memory only)
    pub max_entries: usize,
    /// Transcripts cover "process" (this process only) or "system" (every
    /// process writing to the store)
    pub scope: Scope,
}

// =============================================================================
// Destination Configuration
// =============================================================================

/// Destinations registered when building from config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationsConfig {
    /// Rotating log file (unset = disabled)
    pub file: Option<FileConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub path: PathBuf,
    /// Rotate once the active file reaches this size
    pub max_bytes: u64,
    /// Rotated files kept (`app.log.1` .. `app.log.N`)
    pub max_files: usize,
    /// Records below this level are not written
    pub min_level: Severity,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE_DESTINATION_FILE),
            max_bytes: FILE_DESTINATION_MAX_BYTES,
            max_files: FILE_DESTINATION_MAX_FILES,
            min_level: Severity::Debug,
        }
    }
}

impl FileConfig {
    pub fn destination_config(&self) -> FileDestinationConfig {
        let mut cfg = FileDestinationConfig::new(&self.path);
        cfg.max_bytes = self.max_bytes;
        cfg.max_files = self.max_files;
        cfg.min_level = self.min_level;
        cfg
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            subsystem: None,
            default_interval_secs: DEFAULT_TRANSCRIPT_INTERVAL_SECS,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            path: PathBuf::from(DEFAULT_JSONL_STORE_FILE),
            max_entries: DEFAULT_MEMORY_STORE_ENTRIES,
            scope: Scope::CurrentProcess,
        }
    }
}

impl Config {
    /// Defaults of the `oslogs` binary when no config file exists
    ///
    /// Each invocation is its own process, so the binary reads a shared jsonl
    /// store across processes instead of an in-memory one.
    pub fn for_command_line() -> Self {
        let mut config = Self::default();
        config.store.kind = StoreKind::Jsonl;
        config.store.scope = Scope::System;
        config
    }

    /// Reject values the facility cannot run with
    pub fn validate(&self) -> Result<()> {
        if let Some(subsystem) = &self.logs.subsystem {
            if subsystem.trim().is_empty() {
                return Err(LogsError::ConfigValidation {
                    field: "logs.subsystem",
                    reason: "must not be blank".into(),
                });
            }
        }
        if self.store.max_entries == 0 {
            return Err(LogsError::ConfigValidation {
                field: "store.max_entries",
                reason: "must be greater than zero".into(),
            });
        }
        if self.store.kind == StoreKind::Jsonl && self.store.path.as_os_str().is_empty() {
            return Err(LogsError::ConfigValidation {
                field: "store.path",
                reason: "required for the jsonl store".into(),
            });
        }
        if let Some(file) = &self.destinations.file {
            if file.path.as_os_str().is_empty() {
                return Err(LogsError::ConfigValidation {
                    field: "destinations.file.path",
                    reason: "must not be empty".into(),
                });
            }
            if file.max_files == 0 {
                return Err(LogsError::ConfigValidation {
                    field: "destinations.file.max_files",
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }
}

/// Default config path: `oslogs.toml` next to the executable, or in the
/// working directory when the executable cannot be located
pub fn default_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Load config from file, falling back to defaults when missing or invalid
pub fn load(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config parse error in {:?}: {}, using defaults", path, e);
                Config::default()
            }
        },
        Err(e) => {
            warn!("Failed to read config {:?}: {}, using defaults", path, e);
            Config::default()
        }
    }
}

/// Save config to file
pub fn save(config: &Config, path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).map_err(|e| LogsError::ConfigValidation {
            field: "config",
            reason: e.to_string(),
        })?;
    fs::write(path, content).map_err(|e| LogsError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

//! Centralized error types for the logging facility
//!
//! All internal failures are represented by the `LogsError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, LogsError>`.
//!
//! None of these escape the public logging surface: `log`/`info`/`error`
//! and transcript retrieval swallow them after reporting.

use std::fmt;
use std::path::PathBuf;

/// All logging facility errors
#[derive(Debug)]
pub enum LogsError {
    // === Store ===
    /// The log store could not be opened or queried
    StoreUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Appending to the log store failed
    StoreWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A store entry could not be encoded for writing
    Encode { source: serde_json::Error },
    /// A persisted store entry could not be decoded
    Decode {
        line: usize,
        source: serde_json::Error,
    },

    // === IO ===
    /// File system operation failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Config ===
    /// Config file could not be read or written
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },

    // === Runtime ===
    /// A background thread could not be started
    ThreadSpawn {
        name: &'static str,
        source: std::io::Error,
    },
    /// Tokio runtime creation failed
    Runtime { source: std::io::Error },
}

impl std::error::Error for LogsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreUnavailable { source, .. }
            | Self::StoreWrite { source, .. }
            | Self::Io { source, .. }
            | Self::ConfigRead { source, .. }
            | Self::ThreadSpawn { source, .. }
            | Self::Runtime { source } => Some(source),
            Self::Encode { source } | Self::Decode { source, .. } => Some(source),
            Self::ConfigValidation { .. } => None,
        }
    }
}

impl fmt::Display for LogsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreUnavailable { path, source } => {
                write!(f, "Cannot open log store {}: {}", path.display(), source)
            }
            Self::StoreWrite { path, source } => {
                write!(f, "Cannot append to log store {}: {}", path.display(), source)
            }
            Self::Encode { source } => write!(f, "Cannot encode log entry: {}", source),
            Self::Decode { line, source } => {
                write!(f, "Malformed log store entry at line {}: {}", line, source)
            }
            Self::Io { path, .. } => write!(f, "IO error: {}", path.display()),
            Self::ConfigRead { path, .. } => write!(f, "Config IO error: {}", path.display()),
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::ThreadSpawn { name, source } => {
                write!(f, "Failed to start {} thread: {}", name, source)
            }
            Self::Runtime { source } => write!(f, "Failed to create runtime: {}", source),
        }
    }
}

/// Alias for Result with LogsError
pub type Result<T> = std::result::Result<T, LogsError>;

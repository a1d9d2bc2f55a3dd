//! Severity model
//!
//! Levels mirror the host log store's own: `default` is the level plain
//! `log` calls are written at.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    /// Level of plain `log` calls
    Default,
    Notice,
    Error,
    Fault,
    Undefined,
    /// A level written by a newer producer that this build does not know
    #[serde(other)]
    Unrecognized,
}

impl Severity {
    /// Human-readable name used in transcripts
    pub fn name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Default => "default",
            Self::Notice => "notice",
            Self::Error => "error",
            Self::Fault => "fault",
            Self::Undefined => "undefined",
            Self::Unrecognized => "undefined new",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

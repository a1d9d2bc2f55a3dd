//! Log store seam
//!
//! The facade writes every record to a host log store and reads transcripts
//! back from it. `LogStore` is that boundary:
//! - `MemoryLogStore` - bounded in-process store
//! - `JsonlLogStore` - append-only JSON-lines file, shareable across processes

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlLogStore;
pub use memory::MemoryLogStore;

use crate::constants::REDACTED_MESSAGE;
use crate::error::Result;
use crate::logging::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Whether a written message may appear verbatim when read back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    /// Stored as `<private>`
    #[default]
    Private,
}

/// Which processes a query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Entries written by this process only
    #[default]
    #[serde(rename = "process")]
    CurrentProcess,
    /// Entries of every process sharing the store
    System,
}

impl Scope {
    fn includes(self, process_id: u32) -> bool {
        match self {
            Scope::CurrentProcess => process_id == std::process::id(),
            Scope::System => true,
        }
    }
}

/// A write request; the store stamps time, process and thread
#[derive(Debug, Clone)]
pub struct StoreWrite {
    pub level: Severity,
    pub subsystem: String,
    pub category: String,
    pub message: String,
    pub visibility: Visibility,
}

/// An entry as returned by a store query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStoreEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub subsystem: String,
    pub category: String,
    /// Message as stored, after redaction
    pub message: String,
    pub process_id: u32,
    pub thread_id: u64,
}

impl LogStoreEntry {
    /// Stamp a write request with the current time, process and thread
    pub fn stamp(write: StoreWrite) -> Self {
        let message = match write.visibility {
            Visibility::Public => write.message,
            Visibility::Private => REDACTED_MESSAGE.to_string(),
        };
        Self {
            timestamp: Utc::now(),
            level: write.level,
            subsystem: write.subsystem,
            category: write.category,
            message,
            process_id: std::process::id(),
            thread_id: current_thread_id(),
        }
    }

    /// Whether this entry answers a query for `scope` at or after `since`
    pub fn matches(&self, scope: Scope, since: DateTime<Utc>) -> bool {
        self.timestamp >= since && scope.includes(self.process_id)
    }
}

/// Host log store
pub trait LogStore: Send + Sync {
    /// Append one entry
    fn write(&self, write: StoreWrite) -> Result<()>;

    /// Entries of `scope` stamped at or after `since`, oldest first
    fn entries_since(&self, scope: Scope, since: DateTime<Utc>) -> Result<Vec<LogStoreEntry>>;
}

/// Small, stable numeric id of the calling thread
pub fn current_thread_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static ID: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    ID.with(|id| *id)
}

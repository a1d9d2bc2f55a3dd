//! JSON-lines log store
//!
//! One `LogStoreEntry` per line, appended with a single write so concurrent
//! processes sharing the file do not interleave lines. Queries re-read the
//! whole file and skip lines that do not decode, such as a tail cut short by
//! a writer that died mid-append.

use super::{LogStore, LogStoreEntry, Scope, StoreWrite};
use crate::error::{LogsError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct JsonlLogStore {
    path: PathBuf,
    /// Serializes appends from this process
    append: Mutex<()>,
}

impl JsonlLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, line: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line)
    }
}

impl LogStore for JsonlLogStore {
    fn write(&self, write: StoreWrite) -> Result<()> {
        let _guard = self.append.lock();
        let entry = LogStoreEntry::stamp(write);

        let mut line =
            serde_json::to_vec(&entry).map_err(|source| LogsError::Encode { source })?;
        line.push(b'\n');

        self.append_line(&line).map_err(|source| LogsError::StoreWrite {
            path: self.path.clone(),
            source,
        })
    }

    fn entries_since(&self, scope: Scope, since: DateTime<Utc>) -> Result<Vec<LogStoreEntry>> {
        let file = File::open(&self.path).map_err(|source| LogsError::StoreUnavailable {
            path: self.path.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line.map_err(|source| LogsError::StoreUnavailable {
                path: self.path.clone(),
                source,
            })?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<LogStoreEntry>(&line) {
                Ok(entry) if entry.matches(scope, since) => entries.push(entry),
                Ok(_) => {}
                Err(source) => {
                    let err = LogsError::Decode {
                        line: index + 1,
                        source,
                    };
                    warn!(line = index + 1, "skipping log store entry: {}", err);
                }
            }
        }
        Ok(entries)
    }
}

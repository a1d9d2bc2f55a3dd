//! In-process log store
//!
//! Ring buffer (`VecDeque`) with a fixed capacity: the oldest entries are
//! dropped once it is full.

use super::{LogStore, LogStoreEntry, Scope, StoreWrite};
use crate::constants::DEFAULT_MEMORY_STORE_ENTRIES;
use crate::error::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;

pub struct MemoryLogStore {
    entries: Mutex<VecDeque<LogStoreEntry>>,
    max_entries: usize,
}

impl MemoryLogStore {
    /// Create a store holding at most `max_entries` (at least one)
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_entries.min(1024))),
            max_entries,
        }
    }

    /// Append an already stamped entry (imports, replays)
    pub fn push(&self, entry: LogStoreEntry) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_STORE_ENTRIES)
    }
}

impl LogStore for MemoryLogStore {
    fn write(&self, write: StoreWrite) -> Result<()> {
        let mut entries = self.entries.lock();
        // Stamped under the lock so insertion order is timestamp order
        let entry = LogStoreEntry::stamp(write);
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
        Ok(())
    }

    fn entries_since(&self, scope: Scope, since: DateTime<Utc>) -> Result<Vec<LogStoreEntry>> {
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|e| e.matches(scope, since))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Severity;
    use crate::store::Visibility;

    fn write(message: &str) -> StoreWrite {
        StoreWrite {
            level: Severity::Default,
            subsystem: "app".into(),
            category: "".into(),
            message: message.into(),
            visibility: Visibility::Public,
        }
    }

    #[test]
    fn test_write_then_query() {
        let store = MemoryLogStore::new(10);
        store.write(write("one")).unwrap();
        store.write(write("two")).unwrap();

        let entries = store
            .entries_since(Scope::CurrentProcess, DateTime::<Utc>::MIN_UTC)
            .unwrap();
        let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[test]
    fn test_rotates_when_full() {
        let store = MemoryLogStore::new(3);
        for m in ["1", "2", "3", "4"] {
            store.write(write(m)).unwrap();
        }

        assert_eq!(store.len(), 3);
        let entries = store
            .entries_since(Scope::System, DateTime::<Utc>::MIN_UTC)
            .unwrap();
        assert_eq!(entries[0].message, "2");
    }

    #[test]
    fn test_since_excludes_older_entries() {
        let store = MemoryLogStore::new(10);
        let mut old = LogStoreEntry::stamp(write("old"));
        old.timestamp = Utc::now() - chrono::Duration::minutes(5);
        store.push(old);
        store.write(write("new")).unwrap();

        let since = Utc::now() - chrono::Duration::minutes(1);
        let entries = store.entries_since(Scope::CurrentProcess, since).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "new");
    }

    #[test]
    fn test_clear() {
        let store = MemoryLogStore::new(10);
        store.write(write("x")).unwrap();
        store.clear();
        assert!(store.is_empty());
    }
}

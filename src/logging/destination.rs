//! Log destinations
//!
//! A destination receives every record emitted through the facade. Any
//! `Fn(&LogRecord) + Send + Sync` closure is a destination; the types here
//! cover the common in-process cases.

use super::LogRecord;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Receiver of emitted log records
///
/// Records are borrowed for the duration of the call only. Implementations
/// clone what they need to keep.
pub trait Destination: Send + Sync {
    fn receive(&self, record: &LogRecord);

    /// Block until received records have reached their final sink
    fn flush(&self) {}
}

impl<F> Destination for F
where
    F: Fn(&LogRecord) + Send + Sync,
{
    fn receive(&self, record: &LogRecord) {
        self(record)
    }
}

/// Collects records in memory
///
/// Clones share the same buffer, so one clone can be registered while
/// another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far, in arrival order
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Destination for MemoryDestination {
    fn receive(&self, record: &LogRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Forwards records into a tokio channel for async consumers
///
/// Never blocks: when the channel is full the record is dropped for this
/// destination only.
#[derive(Debug, Clone)]
pub struct ChannelDestination {
    tx: mpsc::Sender<LogRecord>,
}

impl ChannelDestination {
    /// Create a destination and the receiving end of its channel
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<LogRecord>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn from_sender(tx: mpsc::Sender<LogRecord>) -> Self {
        Self { tx }
    }
}

impl Destination for ChannelDestination {
    fn receive(&self, record: &LogRecord) {
        if let Err(e) = self.tx.try_send(record.clone()) {
            debug!("channel destination dropped record: {}", e);
        }
    }
}

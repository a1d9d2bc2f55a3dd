//! Destination registry and record broadcaster
//!
//! Destinations are append-only and kept for the registry's lifetime.
//!
//! Two dispatch models:
//! - `Queued` (default): `broadcast` enqueues the record on an unbounded
//!   channel drained by one dispatcher thread. Log calls never wait on
//!   destinations, and records reach destinations in enqueue order.
//! - `Inline`: `broadcast` invokes every destination on the caller's thread.
//!
//! Either way a single record is delivered to destinations in registration
//! order, and a panicking destination is isolated from the others.
//!
//! `flush` waits for queued delivery, then for each destination's own flush.

use super::{Destination, LogRecord};
use crate::constants::DISPATCHER_THREAD_NAME;
use crate::error::{LogsError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::warn;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Registry whose dispatcher runs on this thread
    static DISPATCHING_FOR: Cell<Option<u64>> = const { Cell::new(None) };
}

/// How records are handed to destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Dedicated dispatcher thread, fire-and-forget for the caller
    #[default]
    Queued,
    /// Synchronous fan-out on the calling thread
    Inline,
}

type DestinationList = Arc<RwLock<Vec<Arc<dyn Destination>>>>;

enum Command {
    Deliver(LogRecord),
    Flush(mpsc::Sender<()>),
}

/// Ordered, append-only set of destinations
pub struct DestinationRegistry {
    id: u64,
    destinations: DestinationList,
    /// `None` when dispatching inline
    queue: Option<mpsc::Sender<Command>>,
}

impl DestinationRegistry {
    /// Create a registry; falls back to inline dispatch if the dispatcher
    /// thread cannot be started
    pub fn new(mode: DispatchMode) -> Self {
        let id = NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed);
        let destinations: DestinationList = Arc::new(RwLock::new(Vec::new()));

        let queue = match mode {
            DispatchMode::Inline => None,
            DispatchMode::Queued => match spawn_dispatcher(id, destinations.clone()) {
                Ok(tx) => Some(tx),
                Err(e) => {
                    warn!("{}, dispatching inline", e);
                    None
                }
            },
        };

        Self {
            id,
            destinations,
            queue,
        }
    }

    /// Effective dispatch model
    pub fn mode(&self) -> DispatchMode {
        if self.queue.is_some() {
            DispatchMode::Queued
        } else {
            DispatchMode::Inline
        }
    }

    /// Append a destination; it receives every record broadcast after this returns
    pub fn register<D>(&self, destination: D)
    where
        D: Destination + 'static,
    {
        self.register_arc(Arc::new(destination));
    }

    pub fn register_arc(&self, destination: Arc<dyn Destination>) {
        self.destinations.write().push(destination);
    }

    /// Number of registered destinations
    pub fn len(&self) -> usize {
        self.destinations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.read().is_empty()
    }

    /// Deliver a record to every registered destination
    pub fn broadcast(&self, record: LogRecord) {
        let record = match &self.queue {
            Some(tx) => match tx.send(Command::Deliver(record)) {
                Ok(()) => return,
                // Dispatcher gone: deliver here rather than lose the record
                Err(mpsc::SendError(Command::Deliver(record))) => record,
                Err(_) => return,
            },
            None => record,
        };
        deliver(&self.destinations, &record);
    }

    /// Block until every record broadcast before this call has been delivered
    /// and every destination has flushed
    ///
    /// No-op when called from a destination running on this registry's own
    /// dispatcher.
    pub fn flush(&self) {
        if let Some(tx) = &self.queue {
            if self.on_own_dispatcher() {
                return;
            }
            let (ack_tx, ack_rx) = mpsc::channel();
            if tx.send(Command::Flush(ack_tx)).is_ok() {
                let _ = ack_rx.recv();
            }
        }
        flush_destinations(&self.destinations);
    }

    fn on_own_dispatcher(&self) -> bool {
        DISPATCHING_FOR.with(|current| current.get() == Some(self.id))
    }
}

impl Default for DestinationRegistry {
    fn default() -> Self {
        Self::new(DispatchMode::default())
    }
}

fn spawn_dispatcher(id: u64, destinations: DestinationList) -> Result<mpsc::Sender<Command>> {
    let (tx, rx) = mpsc::channel::<Command>();

    thread::Builder::new()
        .name(DISPATCHER_THREAD_NAME.to_string())
        .spawn(move || run_dispatcher(id, rx, destinations))
        .map_err(|source| LogsError::ThreadSpawn {
            name: DISPATCHER_THREAD_NAME,
            source,
        })?;

    Ok(tx)
}

/// Dispatcher loop (blocking, runs in thread until the registry is dropped)
fn run_dispatcher(id: u64, rx: mpsc::Receiver<Command>, destinations: DestinationList) {
    DISPATCHING_FOR.with(|current| current.set(Some(id)));

    for command in rx {
        match command {
            Command::Deliver(record) => deliver(&destinations, &record),
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// Invoke each destination in registration order, isolating panics
fn deliver(destinations: &DestinationList, record: &LogRecord) {
    // Snapshot so destinations may register others without deadlocking
    let snapshot: Vec<Arc<dyn Destination>> = destinations.read().clone();

    for (index, destination) in snapshot.iter().enumerate() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| destination.receive(record)));
        if let Err(payload) = outcome {
            warn!(
                destination = index,
                category = record.category(),
                "log destination panicked: {}",
                panic_message(payload.as_ref())
            );
        }
    }
}

fn flush_destinations(destinations: &DestinationList) {
    let snapshot: Vec<Arc<dyn Destination>> = destinations.read().clone();

    for (index, destination) in snapshot.iter().enumerate() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| destination.flush())) {
            warn!(
                destination = index,
                "log destination panicked on flush: {}",
                panic_message(payload.as_ref())
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{CallSite, MemoryDestination, Severity};
    use parking_lot::Mutex;

    fn record(message: &str) -> LogRecord {
        let site = CallSite::new("src/registry.rs", "test()");
        LogRecord::new(Severity::Info, "tests", message, None, None, &site)
    }

    fn tagging(order: &Arc<Mutex<Vec<String>>>, name: &'static str) -> impl Destination {
        let order = order.clone();
        move |r: &LogRecord| order.lock().push(format!("{}:{}", name, r.message()))
    }

    #[test]
    fn test_inline_delivers_in_registration_order() {
        let registry = DestinationRegistry::new(DispatchMode::Inline);
        let order = Arc::new(Mutex::new(Vec::new()));
        registry.register(tagging(&order, "d1"));
        registry.register(tagging(&order, "d2"));
        registry.register(tagging(&order, "d3"));

        registry.broadcast(record("m"));

        let seen = order.lock().clone();
        assert_eq!(
            seen,
            vec![
                "d1:m [registry.rs test()]",
                "d2:m [registry.rs test()]",
                "d3:m [registry.rs test()]",
            ]
        );
    }

    #[test]
    fn test_queued_delivers_after_flush() {
        let registry = DestinationRegistry::new(DispatchMode::Queued);
        assert_eq!(registry.mode(), DispatchMode::Queued);

        let collector = MemoryDestination::new();
        registry.register(collector.clone());

        for i in 0..50 {
            registry.broadcast(record(&format!("n{}", i)));
        }
        registry.flush();

        let records = collector.records();
        assert_eq!(records.len(), 50);
        assert!(records[0].message().starts_with("n0 "));
        assert!(records[49].message().starts_with("n49 "));
    }

    #[test]
    fn test_panicking_destination_is_isolated() {
        let registry = DestinationRegistry::new(DispatchMode::Inline);
        let before = MemoryDestination::new();
        let after = MemoryDestination::new();

        registry.register(before.clone());
        registry.register(|_: &LogRecord| panic!("destination failure"));
        registry.register(after.clone());

        registry.broadcast(record("still delivered"));

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn test_destination_may_register_during_delivery() {
        let registry = Arc::new(DestinationRegistry::new(DispatchMode::Inline));
        let late = MemoryDestination::new();

        let reg = Arc::downgrade(&registry);
        let late_clone = late.clone();
        let registered = Arc::new(Mutex::new(false));
        let flag = registered.clone();
        registry.register(move |_: &LogRecord| {
            let mut done = flag.lock();
            if !*done {
                if let Some(reg) = reg.upgrade() {
                    reg.register(late_clone.clone());
                }
                *done = true;
            }
        });

        registry.broadcast(record("first"));
        registry.broadcast(record("second"));

        assert_eq!(registry.len(), 2);
        assert_eq!(late.len(), 1);
        assert!(late.records()[0].message().starts_with("second"));
    }

    #[test]
    fn test_concurrent_registration_is_not_lost() {
        let registry = Arc::new(DestinationRegistry::new(DispatchMode::Queued));
        let collectors: Vec<MemoryDestination> = (0..8).map(|_| MemoryDestination::new()).collect();

        let handles: Vec<_> = collectors
            .iter()
            .cloned()
            .map(|c| {
                let registry = registry.clone();
                thread::spawn(move || {
                    registry.register(c);
                    registry.broadcast(record("racing"));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(registry.len(), 8);
        registry.broadcast(record("after"));
        registry.flush();

        for c in &collectors {
            let after: Vec<_> = c
                .records()
                .into_iter()
                .filter(|r| r.message().starts_with("after"))
                .collect();
            assert_eq!(after.len(), 1);
        }
    }

    #[test]
    fn test_flush_is_noop_inline() {
        let registry = DestinationRegistry::new(DispatchMode::Inline);
        registry.flush();
        assert!(registry.is_empty());
    }

    struct Buffered {
        pending: Mutex<Vec<String>>,
        written: Arc<Mutex<Vec<String>>>,
    }

    impl Destination for Buffered {
        fn receive(&self, record: &LogRecord) {
            self.pending.lock().push(record.message().to_string());
        }

        fn flush(&self) {
            let drained: Vec<_> = self.pending.lock().drain(..).collect();
            self.written.lock().extend(drained);
        }
    }

    #[test]
    fn test_flush_reaches_destinations() {
        for mode in [DispatchMode::Inline, DispatchMode::Queued] {
            let registry = DestinationRegistry::new(mode);
            let written = Arc::new(Mutex::new(Vec::new()));
            registry.register(Buffered {
                pending: Mutex::new(Vec::new()),
                written: written.clone(),
            });

            registry.broadcast(record("buffered"));
            registry.flush();

            assert_eq!(*written.lock(), vec!["buffered [registry.rs test()]"]);
        }
    }

    #[test]
    fn test_flush_from_other_registry_dispatcher_waits() {
        let outer = DestinationRegistry::new(DispatchMode::Queued);
        let inner = Arc::new(DestinationRegistry::new(DispatchMode::Queued));
        let inner_collector = MemoryDestination::new();
        inner.register(inner_collector.clone());

        let seen_after_flush = Arc::new(Mutex::new(None));
        let seen = seen_after_flush.clone();
        let relay = inner.clone();
        let collector = inner_collector.clone();
        outer.register(move |r: &LogRecord| {
            relay.broadcast(r.clone());
            relay.flush();
            *seen.lock() = Some(collector.len());
        });

        outer.broadcast(record("relayed"));
        outer.flush();

        assert_eq!(*seen_after_flush.lock(), Some(1));
    }

    #[test]
    fn test_flush_from_own_dispatcher_returns() {
        let registry = Arc::new(DestinationRegistry::new(DispatchMode::Queued));
        let weak = Arc::downgrade(&registry);
        let returned = Arc::new(Mutex::new(false));
        let flag = returned.clone();
        registry.register(move |_: &LogRecord| {
            if let Some(reg) = weak.upgrade() {
                reg.flush();
            }
            *flag.lock() = true;
        });

        registry.broadcast(record("self flush"));
        registry.flush();

        assert!(*returned.lock());
    }

    #[test]
    fn test_panic_message_extraction() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(42u8);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}

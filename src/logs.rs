//! Logging context
//!
//! `Logs` ties a subsystem, a log store and a destination registry together
//! and hands out category-bound `AppLogger`s. Construct one explicitly and
//! pass it around, or use the process-wide instance in the crate root.

use crate::config::{Config, StoreKind};
use crate::constants::{DEFAULT_TRANSCRIPT_INTERVAL_SECS, MAIN_CATEGORY};
use crate::error::Result;
use crate::identity;
use crate::logging::{
    transcript, AppLogger, Destination, DestinationRegistry, DispatchMode, FileDestination,
};
use crate::store::{JsonlLogStore, LogStore, MemoryLogStore, Scope};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

pub struct Logs {
    subsystem: Arc<str>,
    store: Arc<dyn LogStore>,
    registry: Arc<DestinationRegistry>,
    scope: Scope,
    default_interval: Duration,
    main: AppLogger,
}

impl Logs {
    pub fn new(subsystem: impl Into<String>, store: Arc<dyn LogStore>, mode: DispatchMode) -> Self {
        let subsystem: Arc<str> = Arc::from(subsystem.into());
        let registry = Arc::new(DestinationRegistry::new(mode));
        let main = AppLogger::new(
            MAIN_CATEGORY,
            subsystem.clone(),
            store.clone(),
            registry.clone(),
        );

        Self {
            subsystem,
            store,
            registry,
            scope: Scope::default(),
            default_interval: Duration::from_secs(DEFAULT_TRANSCRIPT_INTERVAL_SECS),
            main,
        }
    }

    /// Build from validated config, registering its configured destinations
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn LogStore> = match config.store.kind {
            StoreKind::Memory => Arc::new(MemoryLogStore::new(config.store.max_entries)),
            StoreKind::Jsonl => Arc::new(JsonlLogStore::new(config.store.path.clone())),
        };
        let subsystem = identity::subsystem(config.logs.subsystem.as_deref());

        let logs = Self::new(subsystem, store, config.dispatch.mode)
            .with_scope(config.store.scope)
            .with_default_interval(Duration::from_secs(config.logs.default_interval_secs));

        if let Some(file) = &config.destinations.file {
            logs.register_destination(FileDestination::spawn(file.destination_config())?);
        }
        Ok(logs)
    }

    /// Processes whose entries transcripts cover
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        self.default_interval = interval;
        self
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    /// Logger bound to `category`
    pub fn logger(&self, category: impl Into<String>) -> AppLogger {
        AppLogger::new(
            category,
            self.subsystem.clone(),
            self.store.clone(),
            self.registry.clone(),
        )
    }

    /// General-purpose logger (empty category)
    pub fn main(&self) -> &AppLogger {
        &self.main
    }

    /// Add a destination that receives every subsequent record
    pub fn register_destination<D>(&self, destination: D)
    where
        D: Destination + 'static,
    {
        self.registry.register(destination);
    }

    /// UTF-8 transcript of the trailing `interval`; empty on failure
    ///
    /// Blocks on the store query; keep it off latency-sensitive paths.
    pub fn transcript(&self, interval: Duration, full_log: bool) -> Bytes {
        transcript::transcript(
            self.store.as_ref(),
            self.scope,
            &self.subsystem,
            interval,
            full_log,
            &self.main,
        )
    }

    /// Transcript of this subsystem over the configured default window
    pub fn transcript_default(&self) -> Bytes {
        self.transcript(self.default_interval, false)
    }

    /// Wait until queued records have reached every destination and each
    /// destination has flushed
    pub fn flush(&self) {
        self.registry.flush();
    }
}

impl Default for Logs {
    fn default() -> Self {
        Self::new(
            identity::subsystem(None),
            Arc::new(MemoryLogStore::default()),
            DispatchMode::default(),
        )
    }
}

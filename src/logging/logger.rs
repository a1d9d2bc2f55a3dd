//! Log emitter
//!
//! `AppLogger` is a handle bound to one category. Each call formats a
//! `LogRecord`, writes it to the log store with public visibility and
//! broadcasts it to the registered destinations. Calls never fail
//! observably: store failures are reported through `tracing` only.
//!
//! The `logger_log!`, `logger_info!` and `logger_error!` macros capture the
//! call site automatically.

use super::{CallSite, DestinationRegistry, ErrorValue, LogRecord, Severity};
use crate::store::{LogStore, StoreWrite, Visibility};
use std::sync::Arc;
use tracing::debug;

/// Logging handle bound to a category
#[derive(Clone)]
pub struct AppLogger {
    category: String,
    subsystem: Arc<str>,
    store: Arc<dyn LogStore>,
    registry: Arc<DestinationRegistry>,
}

impl AppLogger {
    pub(crate) fn new(
        category: impl Into<String>,
        subsystem: Arc<str>,
        store: Arc<dyn LogStore>,
        registry: Arc<DestinationRegistry>,
    ) -> Self {
        Self {
            category: category.into(),
            subsystem,
            store,
            registry,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Log at the default level
    pub fn log(&self, message: impl AsRef<str>, site: CallSite) {
        self.note(Severity::Default, message.as_ref(), None, None, &site);
    }

    /// Log at info level, formatted as `event: message`
    pub fn info(&self, message: impl AsRef<str>, event: Option<&str>, site: CallSite) {
        self.note(
            Severity::Info,
            message.as_ref(),
            event.map(String::from),
            None,
            &site,
        );
    }

    /// Log at error level, formatted as `message: error`
    pub fn error(&self, message: impl AsRef<str>, error: Option<ErrorValue>, site: CallSite) {
        self.note(Severity::Error, message.as_ref(), None, error, &site);
    }

    fn note(
        &self,
        level: Severity,
        message: &str,
        event: Option<String>,
        error: Option<ErrorValue>,
        site: &CallSite,
    ) {
        let record = LogRecord::new(level, self.category.as_str(), message, event, error, site);

        let write = StoreWrite {
            level,
            subsystem: self.subsystem.to_string(),
            category: self.category.clone(),
            message: record.message().to_string(),
            visibility: Visibility::Public,
        };
        if let Err(e) = self.store.write(write) {
            debug!("log store write failed: {}", e);
        }

        self.registry.broadcast(record);
    }
}

impl std::fmt::Debug for AppLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppLogger")
            .field("category", &self.category)
            .field("subsystem", &self.subsystem)
            .finish_non_exhaustive()
    }
}

/// Log at the default level with the current call site
///
/// `logger_log!(logger, "connected to {}", host)`
#[macro_export]
macro_rules! logger_log {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log(format!($($arg)+), $crate::call_site!())
    };
}

/// Log at info level with the current call site
///
/// `logger_info!(logger, event = "sync", "pulled {} items", n)`
#[macro_export]
macro_rules! logger_info {
    ($logger:expr, event = $event:expr, $($arg:tt)+) => {
        $logger.info(
            format!($($arg)+),
            Some(::std::convert::AsRef::<str>::as_ref(&$event)),
            $crate::call_site!(),
        )
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(format!($($arg)+), None, $crate::call_site!())
    };
}

/// Log at error level with the current call site
///
/// `logger_error!(logger, error = err, "failed to open {}", path)`
#[macro_export]
macro_rules! logger_error {
    ($logger:expr, error = $error:expr, $($arg:tt)+) => {
        $logger.error(
            format!($($arg)+),
            Some($crate::logging::ErrorValue::from($error)),
            $crate::call_site!(),
        )
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(format!($($arg)+), None, $crate::call_site!())
    };
}

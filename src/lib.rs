//! oslogs - application logging facade
//!
//! Every log call is tagged with its call site, written to a host log store
//! and fanned out to the registered destinations. Transcripts of the store
//! can be read back for a trailing time window.
//!
//! ```no_run
//! use oslogs::{logger_info, logger_log};
//!
//! let player = oslogs::logger("player");
//! logger_log!(player, "buffering");
//! logger_info!(player, event = "play", "started {}", "track-1");
//!
//! oslogs::register_destination(|r: &oslogs::LogRecord| eprintln!("{}", r.message()));
//! let transcript = oslogs::get_log_transcript(std::time::Duration::from_secs(60), false);
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod logging;
pub mod logs;
pub mod store;

pub use error::{LogsError, Result};
pub use logging::{
    AppLogger, CallSite, Destination, DispatchMode, ErrorValue, LogRecord, Severity,
};
pub use logs::Logs;

use bytes::Bytes;
use std::sync::OnceLock;
use std::time::Duration;

static GLOBAL: OnceLock<Logs> = OnceLock::new();

/// Process-wide logging context, created with defaults on first use
pub fn global() -> &'static Logs {
    GLOBAL.get_or_init(Logs::default)
}

/// Install the process-wide context; fails (returning it) if one already exists
pub fn install(logs: Logs) -> std::result::Result<&'static Logs, Logs> {
    GLOBAL.set(logs)?;
    Ok(global())
}

/// Logger bound to `category` on the process-wide context
pub fn logger(category: impl Into<String>) -> AppLogger {
    global().logger(category)
}

/// Process-wide general-purpose logger
pub fn main_logger() -> &'static AppLogger {
    global().main()
}

/// Register a destination on the process-wide context
pub fn register_destination<D>(destination: D)
where
    D: Destination + 'static,
{
    global().register_destination(destination);
}

/// Transcript of the process-wide context's store
pub fn get_log_transcript(interval: Duration, full_log: bool) -> Bytes {
    global().transcript(interval, full_log)
}

//! Log transcripts
//!
//! Reads the log store back for a trailing time window and renders one line
//! per entry:
//!
//! ```text
//! <timestamp>: <level>: <subsystem>-<category>:   <message> -> <thread id>\r\n
//! ```

use super::AppLogger;
use crate::error::Result;
use crate::store::{LogStore, LogStoreEntry, Scope};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Timestamp layout of transcript lines
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %z";

/// Lower bound of a window of `interval` ending at `now` (saturating)
pub fn window_start(now: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(interval)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Render one store entry as a transcript line
pub fn render_entry(entry: &LogStoreEntry) -> String {
    format!(
        "{}: {}: {}-{}:   {} -> {}\r\n",
        entry.timestamp.format(TIMESTAMP_FORMAT),
        entry.level,
        entry.subsystem,
        entry.category,
        entry.message,
        entry.thread_id
    )
}

/// Transcript text of the entries of `scope` at or after `since`
///
/// Only entries of `subsystem` are kept unless `full_log` is set.
pub fn collect(
    store: &dyn LogStore,
    scope: Scope,
    subsystem: &str,
    since: DateTime<Utc>,
    full_log: bool,
) -> Result<String> {
    let entries = store.entries_since(scope, since)?;

    Ok(entries
        .iter()
        .filter(|e| full_log || e.subsystem == subsystem)
        .map(render_entry)
        .collect())
}

/// UTF-8 transcript of the trailing `interval`; never fails
///
/// Retrieval errors are logged through `fallback` and yield an empty buffer.
/// The fallback only emits a record, it never retrieves, so it cannot loop.
pub fn transcript(
    store: &dyn LogStore,
    scope: Scope,
    subsystem: &str,
    interval: Duration,
    full_log: bool,
    fallback: &AppLogger,
) -> Bytes {
    let since = window_start(Utc::now(), interval);
    match collect(store, scope, subsystem, since, full_log) {
        Ok(text) => Bytes::from(text),
        Err(e) => {
            crate::logger_log!(fallback, "Failed to get logs data with error: {}", e);
            Bytes::new()
        }
    }
}

//! Application-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Identity
// =============================================================================

/// Subsystem used when the running application cannot be identified
pub const DEFAULT_SUBSYSTEM: &str = "OSLogger";

/// Environment variable overriding the detected subsystem
pub const SUBSYSTEM_ENV_VAR: &str = "OSLOGS_SUBSYSTEM";

/// Category of the process-wide `main` logger
pub const MAIN_CATEGORY: &str = "";

// =============================================================================
// Retrieval
// =============================================================================

/// Default trailing window for transcripts (seconds, 1 hour)
pub const DEFAULT_TRANSCRIPT_INTERVAL_SECS: u64 = 60 * 60;

/// Rendered in place of messages written with private visibility
pub const REDACTED_MESSAGE: &str = "<private>";

// =============================================================================
// Store
// =============================================================================

/// Default capacity of the in-memory log store
pub const DEFAULT_MEMORY_STORE_ENTRIES: usize = 10_000;

/// Default file name of the JSON-lines log store
pub const DEFAULT_JSONL_STORE_FILE: &str = "oslogs.jsonl";

// =============================================================================
// Destinations
// =============================================================================

/// Queue depth of the file destination writer thread
pub const FILE_DESTINATION_CHANNEL_CAPACITY: usize = 1024;

/// Flush interval of the file destination writer thread (milliseconds)
pub const FILE_DESTINATION_FLUSH_MS: u64 = 250;

/// Smallest rotation threshold accepted by the file destination (bytes)
pub const FILE_DESTINATION_MIN_BYTES: u64 = 1024;

/// Default file of the rotating file destination
pub const DEFAULT_FILE_DESTINATION_FILE: &str = "oslogs.log";

/// Default rotation threshold of the file destination (bytes)
pub const FILE_DESTINATION_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Default number of rotated files kept next to the active one
pub const FILE_DESTINATION_MAX_FILES: usize = 3;

/// Default localhost port of `oslogs monitor`
pub const DEFAULT_MONITOR_PORT: u16 = 9876;

/// Queue depth between the UDP receiver thread and the monitor
pub const MONITOR_CHANNEL_CAPACITY: usize = 1024;

/// Thread name of the record dispatcher
pub const DISPATCHER_THREAD_NAME: &str = "oslogs-dispatcher";

//! Logging facade
//!
//! Centralizes the record pipeline:
//! - `Severity`, `CallSite`, `LogRecord` - what a log call produces
//! - `AppLogger` - category-bound emitter (store write + broadcast)
//! - `DestinationRegistry` - ordered fan-out to registered destinations
//! - `transcript` - reading the store back as text
//! - `file` / `forward` / `receiver` - concrete destinations and UDP monitoring

pub mod call_site;
pub mod destination;
pub mod file;
pub mod format;
pub mod forward;
pub mod level;
pub mod logger;
pub mod receiver;
pub mod record;
pub mod registry;
pub mod transcript;

pub use call_site::CallSite;
pub use destination::{ChannelDestination, Destination, MemoryDestination};
pub use file::{FileDestination, FileDestinationConfig};
pub use forward::{ForwardedRecord, UdpDestination};
pub use level::Severity;
pub use logger::AppLogger;
pub use record::{ErrorValue, LogRecord};
pub use registry::{DestinationRegistry, DispatchMode};

/// Initialize internal tracing for the facility's own diagnostics
///
/// Call early in main() before any logging occurs.
/// Set `verbose` to true for debug-level output.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(tracing_subscriber::EnvFilter::new(level))
        .try_init();
}

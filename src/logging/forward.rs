//! UDP record forwarder
//!
//! Sends each record as one JSON line via UDP to a localhost port, where a
//! monitor (see `receiver`) can pick it up.

use super::{Destination, LogRecord, Severity};
use crate::error::{LogsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::UdpSocket;

/// Wire form of a forwarded record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedRecord {
    pub timestamp: String, // HH:MM:SS.mmm
    pub level: Severity,
    pub category: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Error description; the error object itself does not cross the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ForwardedRecord {
    pub fn from_record(record: &LogRecord) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%H:%M:%S%.3f").to_string(),
            level: record.level(),
            category: record.category().to_string(),
            message: record.message().to_string(),
            event: record.event().map(String::from),
            error: record.error().map(|e| e.description()),
        }
    }
}

/// Monitor line: `<time> [<level>] <category>: <message>`
impl fmt::Display for ForwardedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.timestamp, self.level, self.category, self.message
        )
    }
}

/// Destination forwarding records to `127.0.0.1:<port>`
///
/// Datagrams are fire-and-forget: a missing listener loses records silently.
pub struct UdpDestination {
    socket: UdpSocket,
    target: String,
}

impl UdpDestination {
    /// Bind a sending socket for `127.0.0.1:<port>`
    pub fn bind(port: u16) -> Result<Self> {
        // Bind to any available port for sending
        let socket = UdpSocket::bind("127.0.0.1:0").map_err(|source| LogsError::Io {
            path: "udp://127.0.0.1:0".into(),
            source,
        })?;

        Ok(Self {
            socket,
            target: format!("127.0.0.1:{}", port),
        })
    }
}

impl Destination for UdpDestination {
    fn receive(&self, record: &LogRecord) {
        if let Ok(json) = serde_json::to_string(&ForwardedRecord::from_record(record)) {
            let msg = format!("{}\n", json);
            let _ = self.socket.send_to(msg.as_bytes(), &self.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{CallSite, ErrorValue};

    fn site() -> CallSite {
        CallSite::new("src/sync.rs", "pull()")
    }

    #[test]
    fn test_forwarded_record_serialization() {
        let record = LogRecord::new(
            Severity::Info,
            "sync",
            "pulled",
            Some("fetch".into()),
            None,
            &site(),
        );
        let json = serde_json::to_string(&ForwardedRecord::from_record(&record)).unwrap();

        assert!(json.contains("\"timestamp\""));
        assert!(json.contains("\"info\""));
        assert!(json.contains("fetch: pulled [sync.rs pull()]"));
        assert!(json.contains("\"event\":\"fetch\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_forwarded_record_carries_error_description() {
        let record = LogRecord::new(
            Severity::Error,
            "sync",
            "failed",
            None,
            Some(ErrorValue::new(std::io::Error::other("timeout"))),
            &site(),
        );
        let wire = ForwardedRecord::from_record(&record);

        assert_eq!(wire.error.as_deref(), Some("timeout"));
        assert_eq!(wire.event, None);
    }

    #[test]
    fn test_monitor_line() {
        let wire = ForwardedRecord {
            timestamp: "09:15:02.118".into(),
            level: Severity::Error,
            category: "db".into(),
            message: "write failed: disk full [db.rs flush()]".into(),
            event: None,
            error: Some("disk full".into()),
        };

        assert_eq!(
            wire.to_string(),
            "09:15:02.118 [error] db: write failed: disk full [db.rs flush()]"
        );
    }

    #[test]
    fn test_udp_destination_delivers_to_socket() {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        listener
            .set_read_timeout(Some(std::time::Duration::from_secs(5)))
            .unwrap();
        let port = listener.local_addr().unwrap().port();

        let dest = UdpDestination::bind(port).unwrap();
        let record = LogRecord::new(Severity::Default, "net", "hello", None, None, &site());
        dest.receive(&record);

        let mut buf = [0u8; 4096];
        let (len, _) = listener.recv_from(&mut buf).unwrap();
        let text = std::str::from_utf8(&buf[..len]).unwrap();
        let parsed: ForwardedRecord = serde_json::from_str(text.trim_end()).unwrap();

        assert_eq!(parsed.message, "hello [sync.rs pull()]");
        assert_eq!(parsed.level, Severity::Default);
    }
}

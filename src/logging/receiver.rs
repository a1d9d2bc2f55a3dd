//! Forwarded record receiver
//!
//! Receives `ForwardedRecord` JSON lines via UDP (from a `UdpDestination`,
//! possibly in another process) and hands them to an async consumer.

use super::forward::ForwardedRecord;
use crate::error::{LogsError, Result};
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Spawn a UDP record receiver on `127.0.0.1:<port>`
///
/// Port 0 binds an ephemeral port; the bound port is returned alongside the
/// channel. The thread exits once `shutdown` is set or the receiver is dropped.
pub fn spawn_record_receiver(
    shutdown: Arc<AtomicBool>,
    port: u16,
    capacity: usize,
) -> Result<(u16, mpsc::Receiver<ForwardedRecord>)> {
    let (tx, rx) = mpsc::channel::<ForwardedRecord>(capacity.max(1));

    let addr = format!("127.0.0.1:{port}");
    let io_err = |source| LogsError::Io {
        path: format!("udp://{}", addr).into(),
        source,
    };

    // Bind up-front so callers can handle port-in-use cleanly.
    let socket = UdpSocket::bind(&addr).map_err(io_err)?;
    socket
        .set_read_timeout(Some(Duration::from_millis(100)))
        .ok();
    let bound = socket.local_addr().map_err(io_err)?.port();

    std::thread::Builder::new()
        .name("oslogs-udp-receiver".to_string())
        .spawn(move || run_receiver(socket, tx, shutdown))
        .map_err(|source| LogsError::ThreadSpawn {
            name: "oslogs-udp-receiver",
            source,
        })?;

    Ok((bound, rx))
}

/// Run the receiver loop (blocking, runs in thread)
fn run_receiver(socket: UdpSocket, tx: mpsc::Sender<ForwardedRecord>, shutdown: Arc<AtomicBool>) {
    let mut buf = [0u8; 65535];

    loop {
        if shutdown.load(Ordering::Relaxed) || tx.is_closed() {
            break;
        }

        match socket.recv_from(&mut buf) {
            Ok((len, _addr)) => {
                if let Ok(text) = std::str::from_utf8(&buf[..len]) {
                    for line in text.lines() {
                        match serde_json::from_str::<ForwardedRecord>(line) {
                            Ok(record) => {
                                let _ = tx.try_send(record);
                            }
                            Err(e) => debug!("skipping malformed forwarded record: {}", e),
                        }
                    }
                }
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                // Timeout - check shutdown and continue
                continue;
            }
            Err(_) => break,
        }
    }
}

//! Rotating file destination.
//!
//! Log calls must stay cheap, so file output is implemented as:
//! - a bounded queue (non-blocking `try_send`, records dropped when full)
//! - a dedicated thread with buffered writes, periodic flush and
//!   size-based rotation (`app.log` -> `app.log.1` -> ... -> `app.log.N`)

use super::{Destination, LogRecord, Severity};
use crate::constants::{
    FILE_DESTINATION_CHANNEL_CAPACITY, FILE_DESTINATION_FLUSH_MS, FILE_DESTINATION_MAX_BYTES,
    FILE_DESTINATION_MAX_FILES, FILE_DESTINATION_MIN_BYTES,
};
use crate::error::{LogsError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const WRITER_THREAD_NAME: &str = "oslogs-file-destination";

#[derive(Debug, Clone)]
pub struct FileDestinationConfig {
    pub path: PathBuf,
    pub max_bytes: u64,
    pub max_files: usize,
    pub flush_interval: Duration,
    pub channel_capacity: usize,
    /// Records below this level are skipped
    pub min_level: Severity,
}

impl FileDestinationConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: FILE_DESTINATION_MAX_BYTES,
            max_files: FILE_DESTINATION_MAX_FILES,
            flush_interval: Duration::from_millis(FILE_DESTINATION_FLUSH_MS),
            channel_capacity: FILE_DESTINATION_CHANNEL_CAPACITY,
            min_level: Severity::Debug,
        }
    }
}

enum WriterMessage {
    Line(String),
    Sync(mpsc::Sender<()>),
}

/// Destination appending one line per record to a rotating file
pub struct FileDestination {
    tx: SyncSender<WriterMessage>,
    min_level: Severity,
}

impl FileDestination {
    /// Open (or create) the file and start the writer thread
    pub fn spawn(cfg: FileDestinationConfig) -> Result<Self> {
        let io_err = |source| LogsError::Io {
            path: cfg.path.clone(),
            source,
        };

        if let Some(parent) = cfg.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let (file, size) = open_append(&cfg.path).map_err(io_err)?;
        let (tx, rx) = sync_channel::<WriterMessage>(cfg.channel_capacity.max(1));
        let min_level = cfg.min_level;

        thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || run_writer(rx, cfg, file, size))
            .map_err(|source| LogsError::ThreadSpawn {
                name: WRITER_THREAD_NAME,
                source,
            })?;

        Ok(Self { tx, min_level })
    }
}

impl Destination for FileDestination {
    fn receive(&self, record: &LogRecord) {
        if record.level() < self.min_level {
            return;
        }
        if self.tx.try_send(WriterMessage::Line(format_line(record))).is_err() {
            debug!("file destination queue full, record dropped");
        }
    }

    /// Wait until queued lines are written and flushed to disk
    fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(WriterMessage::Sync(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

fn run_writer(rx: Receiver<WriterMessage>, cfg: FileDestinationConfig, file: File, start_size: u64) {
    let max_bytes = cfg.max_bytes.max(FILE_DESTINATION_MIN_BYTES);
    let max_files = cfg.max_files.max(1);
    let flush_interval = if cfg.flush_interval.is_zero() {
        Duration::from_millis(FILE_DESTINATION_FLUSH_MS)
    } else {
        cfg.flush_interval
    };

    let mut writer = BufWriter::new(file);
    let mut size = start_size;
    let mut dirty = false;
    let mut last_flush = Instant::now();

    loop {
        match rx.recv_timeout(flush_interval) {
            Ok(WriterMessage::Sync(ack)) => {
                if dirty {
                    let _ = writer.flush();
                    dirty = false;
                    last_flush = Instant::now();
                }
                let _ = ack.send(());
            }
            Ok(WriterMessage::Line(line)) => {
                if write_line(&mut writer, &line).is_ok() {
                    size = size.saturating_add(line.len() as u64 + 1);
                    dirty = true;
                }

                if size >= max_bytes {
                    let _ = writer.flush();
                    drop(writer);
                    let _ = rotate_files(&cfg.path, max_files);
                    match open_truncate(&cfg.path) {
                        Ok(f) => {
                            writer = BufWriter::new(f);
                            size = 0;
                            dirty = false;
                            last_flush = Instant::now();
                        }
                        Err(_) => {
                            // Cannot reopen: stop writing
                            break;
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if dirty && last_flush.elapsed() >= flush_interval {
                    let _ = writer.flush();
                    dirty = false;
                    last_flush = Instant::now();
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = writer.flush();
                break;
            }
        }
    }
}

fn write_line(writer: &mut BufWriter<File>, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn format_line(record: &LogRecord) -> String {
    format!(
        "{} [{}] {}: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.category(),
        record.message()
    )
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

fn open_truncate(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

fn rotate_files(path: &Path, max_files: usize) -> io::Result<()> {
    if max_files == 0 {
        return Ok(());
    }

    let stem = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "oslogs.log".to_string());
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    // Remove the oldest.
    let oldest = dir.join(format!("{}.{}", stem, max_files));
    let _ = fs::remove_file(&oldest);

    // Shift: N-1 -> N, ... 1 -> 2.
    for i in (1..max_files).rev() {
        let src = dir.join(format!("{}.{}", stem, i));
        let dst = dir.join(format!("{}.{}", stem, i + 1));
        if src.exists() {
            let _ = fs::rename(&src, &dst);
        }
    }

    // Active -> .1
    let first = dir.join(format!("{}.1", stem));
    if path.exists() {
        let _ = fs::rename(path, first);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::CallSite;

    fn unique_temp_dir() -> PathBuf {
        let base = std::env::temp_dir();
        let pid = std::process::id();
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        base.join(format!("oslogs-filelog-{}-{}", pid, ts))
    }

    fn record(level: Severity, message: &str) -> LogRecord {
        let site = CallSite::new("src/main.rs", "main()");
        LogRecord::new(level, "io", message, None, None, &site)
    }

    #[test]
    fn test_rotate_files_keeps_max_files() {
        let dir = unique_temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("app.log");

        fs::write(&path, "active").unwrap();
        fs::write(dir.join("app.log.1"), "one").unwrap();
        fs::write(dir.join("app.log.2"), "two").unwrap();

        rotate_files(&path, 2).unwrap();

        assert!(dir.join("app.log.1").exists());
        assert!(dir.join("app.log.2").exists());
        assert!(!dir.join("app.log.3").exists());
        assert_eq!(fs::read_to_string(dir.join("app.log.1")).unwrap(), "active");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_format_line() {
        let line = format_line(&record(Severity::Error, "boom"));
        assert!(line.ends_with(" [error] io: boom [main.rs main()]"));
    }

    #[test]
    fn test_flush_waits_for_writer() {
        let dir = unique_temp_dir();
        let path = dir.join("app.log");
        let mut cfg = FileDestinationConfig::new(&path);
        cfg.flush_interval = Duration::from_secs(60);

        let dest = FileDestination::spawn(cfg).unwrap();
        dest.receive(&record(Severity::Notice, "first"));
        dest.receive(&record(Severity::Error, "second"));
        dest.flush();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" [notice] io: first [main.rs main()]"));
        assert!(lines[1].ends_with(" [error] io: second [main.rs main()]"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_writer_flushes_on_disconnect() {
        let dir = unique_temp_dir();
        let path = dir.join("app.log");
        let mut cfg = FileDestinationConfig::new(&path);
        cfg.min_level = Severity::Info;

        let dest = FileDestination::spawn(cfg).unwrap();
        dest.receive(&record(Severity::Debug, "filtered"));
        dest.receive(&record(Severity::Info, "kept"));
        drop(dest);

        // Writer exits on disconnect after flushing
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut content = String::new();
        while Instant::now() < deadline {
            content = fs::read_to_string(&path).unwrap_or_default();
            if content.contains("kept") {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }

        assert!(content.contains("kept [main.rs main()]"));
        assert!(!content.contains("filtered"));

        let _ = fs::remove_dir_all(&dir);
    }
}

//! oslogs - log records from the command line
//!
//! Usage:
//!   oslogs emit [--category C] [--level default|info|error] [--event E] [--forward PORT] MESSAGE
//!   oslogs transcript [--interval SECS] [--full] [--all-processes]
//!   oslogs monitor [--port PORT] [--count N]
//!
//! Without a config file the binary uses a shared `jsonl` store read across
//! processes, so records emitted by one invocation show up in the transcript
//! of the next.

mod cli;

use clap::Parser;
use cli::{Cli, Command, EmitLevel};
use oslogs::config::{self, Config};
use oslogs::constants::MONITOR_CHANNEL_CAPACITY;
use oslogs::logging::{self, receiver, UdpDestination};
use oslogs::store::Scope;
use oslogs::{call_site, Logs, LogsError};
use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(config::default_path);
    let config = if config_path.exists() {
        config::load(&config_path)
    } else {
        Config::for_command_line()
    };

    let result = match cli.command {
        Command::Emit {
            category,
            level,
            event,
            forward,
            message,
        } => run_emit(&config, category, level, event, forward, message),
        Command::Transcript {
            interval,
            full,
            all_processes,
        } => run_transcript(&config, interval, full, all_processes),
        Command::Monitor { port, count } => run_monitor(port, count),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_emit(
    config: &Config,
    category: String,
    level: EmitLevel,
    event: Option<String>,
    forward: Option<u16>,
    message: String,
) -> oslogs::Result<()> {
    let logs = Logs::from_config(config)?;
    if let Some(port) = forward {
        match UdpDestination::bind(port) {
            Ok(dest) => logs.register_destination(dest),
            Err(e) => eprintln!("Warning: {}", e),
        }
    }

    let logger = logs.logger(category);
    match level {
        EmitLevel::Default => logger.log(&message, call_site!()),
        EmitLevel::Info => logger.info(&message, event.as_deref(), call_site!()),
        EmitLevel::Error => logger.error(&message, None, call_site!()),
    }
    logs.flush();
    Ok(())
}

fn run_transcript(
    config: &Config,
    interval: Option<u64>,
    full: bool,
    all_processes: bool,
) -> oslogs::Result<()> {
    let mut logs = Logs::from_config(config)?;
    if all_processes {
        logs = logs.with_scope(Scope::System);
    }

    let secs = interval.unwrap_or(config.logs.default_interval_secs);
    let bytes = logs.transcript(Duration::from_secs(secs), full);

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&bytes)
        .and_then(|_| stdout.flush())
        .map_err(|source| LogsError::Io {
            path: "<stdout>".into(),
            source,
        })
}

/// Print forwarded records until interrupted or `count` records arrived
fn run_monitor(port: u16, count: Option<usize>) -> oslogs::Result<()> {
    let rt = tokio::runtime::Runtime::new().map_err(|source| LogsError::Runtime { source })?;

    rt.block_on(async move {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (bound, mut rx) =
            receiver::spawn_record_receiver(shutdown.clone(), port, MONITOR_CHANNEL_CAPACITY)?;
        eprintln!("Listening on UDP 127.0.0.1:{}", bound);

        let mut seen = 0usize;
        loop {
            tokio::select! {
                record = rx.recv() => {
                    let Some(record) = record else { break };
                    println!("{}", record);
                    seen += 1;
                    if count.is_some_and(|n| seen >= n) {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        shutdown.store(true, Ordering::SeqCst);
        Ok(())
    })
}

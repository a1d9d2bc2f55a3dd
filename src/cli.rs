//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::{Parser, Subcommand, ValueEnum};
use oslogs::constants::DEFAULT_MONITOR_PORT;
use std::path::PathBuf;

const LONG_ABOUT: &str = "\
Emit log records and read transcripts back from the configured store.

Without a config file, records go to `oslogs.jsonl` in the working directory
and transcripts cover every process writing to it, so `transcript` shows the
records of earlier `emit` runs. A config file with the default in-memory store
only ever shows the current invocation's records.";

// =============================================================================
// CLI Definition
// =============================================================================

/// Emit log records and read transcripts back from the configured store
#[derive(Parser, Debug)]
#[command(name = "oslogs")]
#[command(author, version, about, long_about = LONG_ABOUT)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (default: oslogs.toml next to the executable)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Level of an emitted record
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitLevel {
    #[default]
    Default,
    Info,
    Error,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log one message
    Emit {
        /// Category of the logger
        #[arg(long, default_value = "")]
        category: String,

        #[arg(long, value_enum, default_value_t = EmitLevel::Default)]
        level: EmitLevel,

        /// Event tag (info level)
        #[arg(long)]
        event: Option<String>,

        /// Also forward the record via UDP to this localhost port
        #[arg(long, value_name = "PORT")]
        forward: Option<u16>,

        message: String,
    },

    /// Print the transcript of a trailing time window
    Transcript {
        /// Window length in seconds (default: from config)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,

        /// Include entries of every subsystem
        #[arg(long)]
        full: bool,

        /// Include entries written by other processes
        #[arg(long)]
        all_processes: bool,
    },

    /// Print records forwarded by `emit --forward` until interrupted
    Monitor {
        /// Localhost UDP port to listen on
        #[arg(long, default_value_t = DEFAULT_MONITOR_PORT)]
        port: u16,

        /// Exit after this many records
        #[arg(long, value_name = "N")]
        count: Option<usize>,
    },
}

// =============================================================================
// Tests
// =============================================================================

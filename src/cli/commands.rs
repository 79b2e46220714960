//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Incremental feedback sync into a Feishu bitable
#[derive(Parser, Debug)]
#[command(name = "earthworm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML), defaults to config.yaml next to the executable
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command to run; a bare invocation is a sync run
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Run { dry_run: false })
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sync new feedback rows (default)
    Run {
        /// Resolve, fetch and transform only; upload and commit nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the watermark, recent checkpoints and token expiry
    Status {
        /// Number of checkpoints to show
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Test the source connection and obtain a token
    Check,

    /// Move the watermark by hand (after a drift stop)
    SetWatermark {
        /// New watermark
        #[arg(long)]
        feed_id: i64,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

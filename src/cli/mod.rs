//! CLI module
//!
//! Command-line interface for the sync job.
//!
//! # Commands
//!
//! - `run` - One incremental sync (the default)
//! - `status` - Show watermark, checkpoints and token expiry
//! - `check` - Test the source connection and the app credentials
//! - `set-watermark` - Operator override after a safety stop

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

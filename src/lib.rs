// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Earthworm
//!
//! One-shot incremental sync of user feedback rows into a Feishu bitable.
//!
//! ## Features
//!
//! - **Incremental**: Only ids above the committed watermark are read
//! - **Safety stops**: A checkpoint ahead of the source or a backlog above
//!   the drift limit aborts the run for an operator to look at
//! - **Commit after upload**: The watermark moves only once the destination
//!   confirmed the records (at-least-once delivery)
//! - **Token cache**: Tenant access tokens are persisted and refreshed
//!   before they expire
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use earthworm::cli::{Cli, Runner};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> earthworm::Result<()> {
//!     let runner = Runner::new(Cli::parse());
//!     let settings = runner.load_settings()?;
//!     runner.run(&settings).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         SyncEngine                           │
//! │  resolve → fetch → transform → upload → commit               │
//! └──────────────────────────────────────────────────────────────┘
//!        │              │               │              │
//! ┌──────┴─────┐ ┌──────┴──────┐ ┌──────┴──────┐ ┌─────┴────────┐
//! │  database  │ │  transform  │ │   feishu    │ │    state     │
//! │ DuckDB     │ │ RecordMapper│ │ auth/upload │ │ checkpoints  │
//! │ MySQL/PG/..│ │             │ │ http client │ │ token cache  │
//! └────────────┘ └─────────────┘ └─────────────┘ └──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Injectable time source
pub mod clock;

/// Settings file
pub mod config;

/// Template interpolation
pub mod template;

/// Local embedded store
pub mod store;

/// Watermark checkpoints
pub mod state;

/// Tenant access token cache
pub mod auth;

/// Source database access via DuckDB
pub mod database;

/// Capability traits consumed by the engine
pub mod connector;

/// HTTP client with timeout and rate limiting
pub mod http;

/// Feishu open platform client
pub mod feishu;

/// Source row to destination record mapping
pub mod transform;

/// Range resolution and sync orchestration
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::Settings;
pub use engine::{SyncEngine, SyncOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

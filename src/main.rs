// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]

//! Earthworm CLI
//!
//! Runs one incremental feedback sync and exits

use clap::Parser;
use earthworm::cli::{Cli, Runner};
use earthworm::LogLevel;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let runner = Runner::new(cli);
    let settings = runner.load_settings();

    // Initialize logging: RUST_LOG wins, then --verbose, then the settings file
    let level = if verbose {
        LogLevel::Debug
    } else {
        settings
            .as_ref()
            .map(|s| s.log_level)
            .unwrap_or_default()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(tracing::Level::from(level).into()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match settings {
        Ok(settings) => runner.run(&settings).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        if e.requires_operator() {
            eprintln!(
                "Hint: this is a safety stop, not a transient failure. Inspect the source \
                 table, then move the watermark with `earthworm set-watermark --feed-id <N>`."
            );
        }
        std::process::exit(1);
    }
}

//! CLI runner - executes commands

use crate::auth::{TokenCache, TokenStore};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::Settings;
use crate::connector::FeedbackSource;
use crate::database::SourceEngine;
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::{Result, ResultExt};
use crate::feishu::FeishuClient;
use crate::state::WatermarkStore;
use crate::store::LocalStore;
use crate::transform::RecordMapper;
use crate::types::FeedId;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parsed command line
    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Settings file in use
    pub fn settings_path(&self) -> Result<PathBuf> {
        match &self.cli.config {
            Some(path) => Ok(path.clone()),
            None => Settings::default_path(),
        }
    }

    /// Load and validate the settings file
    pub fn load_settings(&self) -> Result<Settings> {
        let path = self.settings_path()?;
        Settings::load(&path).with_context(|| format!("Loading {}", path.display()))
    }

    /// Run the CLI command
    pub async fn run(&self, settings: &Settings) -> Result<()> {
        match self.cli.command() {
            Commands::Run { dry_run } => self.sync(settings, dry_run).await,
            Commands::Status { limit } => self.status(settings, limit),
            Commands::Check => self.check(settings).await,
            Commands::SetWatermark { feed_id } => self.set_watermark(settings, feed_id),
        }
    }

    /// One sync run
    async fn sync(&self, settings: &Settings, dry_run: bool) -> Result<()> {
        let mut engine = Self::build_engine(settings, dry_run)?;
        let outcome = engine.run().await?;
        let stats = engine.stats();

        self.output_message(&json!({
            "type": "SYNC",
            "sync": {
                "result": outcome,
                "fetched": stats.fetched,
                "uploaded": stats.uploaded,
                "duration_ms": stats.duration_ms,
            }
        }));
        Ok(())
    }

    /// Report the local state
    fn status(&self, settings: &Settings, limit: usize) -> Result<()> {
        let local = Self::open_local(settings)?;
        let watermarks = WatermarkStore::new(local.clone());
        let token = TokenStore::new(local).load()?;

        self.output_message(&json!({
            "type": "STATUS",
            "status": {
                "watermark": watermarks.open_watermark()?,
                "checkpoints": watermarks.history(limit)?,
                "token_expires_at": token.map(|t| t.expires_at),
            }
        }));
        Ok(())
    }

    /// Verify the source connection and the app credentials
    async fn check(&self, settings: &Settings) -> Result<()> {
        let result = self.check_inner(settings).await;

        let (status, message) = match &result {
            Ok(max_id) => (
                "SUCCEEDED",
                format!("Source reachable (max id {max_id}), token obtained"),
            ),
            Err(e) => ("FAILED", format!("Connection failed: {e}")),
        };
        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": status,
                "message": message
            }
        }));

        result.map(|_| ())
    }

    async fn check_inner(&self, settings: &Settings) -> Result<FeedId> {
        let source = SourceEngine::new(&settings.source)?;
        source.check_connection()?;
        let max_id = source.max_id()?;
        tracing::info!("Source {} reachable", source.connection_info());

        let local = Self::open_local(settings)?;
        let client = Arc::new(FeishuClient::new(
            &settings.feishu,
            settings.mapping.clone(),
        )?);
        let tokens = TokenCache::new(local, client, settings.feishu.app.clone());
        tokens.get_valid_token().await?;

        Ok(max_id)
    }

    /// Operator override of the watermark
    fn set_watermark(&self, settings: &Settings, feed_id: FeedId) -> Result<()> {
        let local = Self::open_local(settings)?;
        let watermarks = WatermarkStore::new(local);
        let current = watermarks.current()?;

        tracing::warn!("Manually moving watermark {} -> {}", current, feed_id);
        watermarks.commit(current, feed_id)?;

        self.output_message(&json!({
            "type": "WATERMARK",
            "watermark": {
                "previous": current,
                "current": feed_id
            }
        }));
        Ok(())
    }

    /// Wire the sync engine from the settings
    fn build_engine(settings: &Settings, dry_run: bool) -> Result<SyncEngine> {
        let local = Self::open_local(settings)?;
        let source = SourceEngine::new(&settings.source).context("Connecting to source")?;
        tracing::info!("Reading feedback from {}", source.connection_info());

        let client = Arc::new(
            FeishuClient::new(&settings.feishu, settings.mapping.clone())?
                .with_batch_size(settings.sync.batch_size),
        );
        let tokens = TokenCache::new(local.clone(), client.clone(), settings.feishu.app.clone());

        let config = SyncConfig::new()
            .with_max_drift_rows(settings.sync.max_drift_rows)
            .with_dry_run(dry_run);

        Ok(SyncEngine::new(
            Box::new(source),
            WatermarkStore::new(local),
            tokens,
            client,
            RecordMapper::new(settings.mapping.clone()),
            settings.feishu.drive.clone(),
        )
        .with_config(config))
    }

    fn open_local(settings: &Settings) -> Result<LocalStore> {
        LocalStore::open(&settings.local.path).context("Opening local store")
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

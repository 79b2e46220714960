//! Execution engine module
//!
//! One sync run from watermark to watermark.
//!
//! # Overview
//!
//! The engine module provides:
//! - `range` - Resolves the new id range and enforces the drift limit
//! - `SyncEngine` - Sequences resolve, fetch, transform, upload and commit
//! - `SyncOutcome` / `SyncStats` / `SyncPhase` - What a run did
//!
//! The watermark is committed only after the destination confirmed the
//! upload. Any error aborts the run with the watermark untouched, so the
//! next run derives the same range again.

pub mod range;
mod types;

pub use range::{resolve, SyncRange};
pub use types::{SyncConfig, SyncOutcome, SyncPhase, SyncStats};

use crate::auth::TokenCache;
use crate::config::DriveTarget;
use crate::connector::{FeedbackSource, RecordUploader};
use crate::error::Result;
use crate::state::WatermarkStore;
use crate::transform::RecordMapper;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Sync engine for one incremental run
pub struct SyncEngine {
    /// Source feedback table
    source: Box<dyn FeedbackSource>,
    /// Local watermark
    watermarks: WatermarkStore,
    /// Bearer token for uploads
    tokens: TokenCache,
    /// Destination API
    uploader: Arc<dyn RecordUploader>,
    /// Row to record mapping
    mapper: RecordMapper,
    /// Destination table
    target: DriveTarget,
    /// Sync configuration
    config: SyncConfig,
    /// Current phase
    phase: SyncPhase,
    /// Statistics
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        source: Box<dyn FeedbackSource>,
        watermarks: WatermarkStore,
        tokens: TokenCache,
        uploader: Arc<dyn RecordUploader>,
        mapper: RecordMapper,
        target: DriveTarget,
    ) -> Self {
        Self {
            source,
            watermarks,
            tokens,
            uploader,
            mapper,
            target,
            config: SyncConfig::default(),
            phase: SyncPhase::Init,
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Phase reached by the last run
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Get the watermark store
    pub fn watermarks(&self) -> &WatermarkStore {
        &self.watermarks
    }

    /// Run one sync
    pub async fn run(&mut self) -> Result<SyncOutcome> {
        let start = Instant::now();
        self.phase = SyncPhase::Init;
        self.stats = SyncStats::new();

        let result = self.execute().await;
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        match &result {
            Ok(outcome) => info!(
                "{} (fetched {}, {}ms)",
                outcome, self.stats.fetched, self.stats.duration_ms
            ),
            Err(e) => {
                error!("Sync aborted during {} phase: {}", self.phase, e);
                if e.is_transport() {
                    warn!("Watermark left unchanged, the next run retries the same range");
                }
                self.phase = SyncPhase::Aborted;
            }
        }

        result
    }

    async fn execute(&mut self) -> Result<SyncOutcome> {
        let local = self.watermarks.current()?;
        let remote = self.source.max_id()?;
        info!("Local watermark {}, remote max id {}", local, remote);

        let range = resolve(local, remote, self.config.max_drift_rows)?;
        self.advance(SyncPhase::RangeResolved);

        if range.is_empty() {
            info!("No new feedback since {}", local);
            return Ok(SyncOutcome::UpToDate { watermark: local });
        }

        let rows = self.source.fetch_by_ids(&range.ids())?;
        self.stats.fetched = rows.len();
        self.advance(SyncPhase::Fetched);
        if (rows.len() as i64) < range.len() {
            debug!(
                "{} of {} ids in {} have no source row",
                range.len() - rows.len() as i64,
                range.len(),
                range
            );
        }

        let records = self.mapper.transform_all(&rows)?;
        self.stats.transformed = records.len();
        self.advance(SyncPhase::Transformed);

        if self.config.dry_run {
            info!("Dry run: skipping upload and commit for {}", range);
            return Ok(SyncOutcome::DryRun {
                from: range.begin,
                to: range.end,
                records: records.len(),
            });
        }

        let uploaded = if records.is_empty() {
            warn!("No source rows in {}, nothing to upload", range);
            0
        } else {
            let token = self.tokens.get_valid_token().await?;
            let uploaded = self
                .uploader
                .batch_create_records(&self.target, &records, &token)
                .await?;
            self.stats.uploaded = uploaded;
            self.advance(SyncPhase::Uploaded);
            uploaded
        };

        self.watermarks.commit(range.begin, range.end)?;
        self.advance(SyncPhase::Committed);

        Ok(SyncOutcome::Synced {
            from: range.begin,
            to: range.end,
            uploaded,
        })
    }

    fn advance(&mut self, phase: SyncPhase) {
        debug!("Sync phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("target", &self.target)
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

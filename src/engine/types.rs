//! Engine types
//!
//! Phases, outcome and statistics of a sync run.

use crate::types::FeedId;
use serde::{Deserialize, Serialize};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Nothing done yet
    #[default]
    Init,
    /// The id range is known
    RangeResolved,
    /// Raw rows were read from the source
    Fetched,
    /// Rows were mapped to destination records
    Transformed,
    /// The destination confirmed the upload
    Uploaded,
    /// The new watermark is persisted
    Committed,
    /// The run failed; nothing was committed
    Aborted,
}

impl SyncPhase {
    /// Check if the run has finished, successfully or not
    pub fn is_terminal(self) -> bool {
        matches!(self, SyncPhase::Committed | SyncPhase::Aborted)
    }
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncPhase::Init => "init",
            SyncPhase::RangeResolved => "range_resolved",
            SyncPhase::Fetched => "fetched",
            SyncPhase::Transformed => "transformed",
            SyncPhase::Uploaded => "uploaded",
            SyncPhase::Committed => "committed",
            SyncPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No new rows; the watermark was left alone
    UpToDate { watermark: FeedId },
    /// Rows in `(from, to]` were uploaded and `to` committed
    Synced {
        from: FeedId,
        to: FeedId,
        uploaded: usize,
    },
    /// Rows in `(from, to]` were transformed but neither uploaded nor committed
    DryRun {
        from: FeedId,
        to: FeedId,
        records: usize,
    },
}

impl SyncOutcome {
    /// Watermark after the run
    pub fn watermark(&self) -> FeedId {
        match self {
            SyncOutcome::UpToDate { watermark } => *watermark,
            SyncOutcome::Synced { to, .. } => *to,
            SyncOutcome::DryRun { from, .. } => *from,
        }
    }
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOutcome::UpToDate { watermark } => {
                write!(f, "Up to date at watermark {watermark}")
            }
            SyncOutcome::Synced { from, to, uploaded } => {
                write!(f, "Synced ({from}, {to}]: {uploaded} records uploaded")
            }
            SyncOutcome::DryRun { from, to, records } => {
                write!(
                    f,
                    "Dry run ({from}, {to}]: {records} records would be uploaded"
                )
            }
        }
    }
}

/// Run behaviour
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Largest backlog processed without operator review
    pub max_drift_rows: i64,
    /// Transform but do not upload or commit
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_drift_rows: 1000,
            dry_run: false,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the drift limit
    #[must_use]
    pub fn with_max_drift_rows(mut self, rows: i64) -> Self {
        self.max_drift_rows = rows;
        self
    }

    /// Enable or disable dry run
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Statistics from a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Rows read from the source
    pub fetched: usize,
    /// Destination records built
    pub transformed: usize,
    /// Records the destination confirmed
    pub uploaded: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

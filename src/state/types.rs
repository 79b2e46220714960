//! Checkpoint types

use crate::error::{Error, Result};
use crate::types::FeedId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle flag of a checkpoint row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointFlag {
    /// Current resumable position
    Open,
    /// Superseded by a later checkpoint
    Closed,
}

impl CheckpointFlag {
    /// Value stored in the `flag` column
    pub fn as_i32(self) -> i32 {
        match self {
            CheckpointFlag::Open => 0,
            CheckpointFlag::Closed => 1,
        }
    }

    /// Parse the stored `flag` column
    pub fn from_i32(value: i32) -> Result<Self> {
        match value {
            0 => Ok(CheckpointFlag::Open),
            1 => Ok(CheckpointFlag::Closed),
            other => Err(Error::checkpoint(format!(
                "Unknown checkpoint flag value: {other}"
            ))),
        }
    }
}

/// A persisted watermark row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Row id (monotonic)
    pub id: i64,
    /// Highest source id synchronized when this row was written
    pub feed_id: FeedId,
    /// Open or closed
    pub flag: CheckpointFlag,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Check if this is the open checkpoint
    pub fn is_open(&self) -> bool {
        self.flag == CheckpointFlag::Open
    }
}

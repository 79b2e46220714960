//! Range resolution
//!
//! Decides which source ids are new since the last watermark, refusing to
//! proceed when the checkpoint is ahead of the source or the backlog is
//! larger than the configured drift.

use crate::error::{Error, Result};
use crate::types::FeedId;
use serde::{Deserialize, Serialize};

/// Ids in `(begin, end]` that still need to be synchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRange {
    /// Last committed watermark (exclusive)
    pub begin: FeedId,
    /// Remote max id (inclusive)
    pub end: FeedId,
}

impl SyncRange {
    /// Number of ids in the range
    pub fn len(&self) -> i64 {
        self.end - self.begin
    }

    /// Check if there is nothing new
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// The ids `begin + 1 ..= end` in ascending order
    pub fn ids(&self) -> Vec<FeedId> {
        (self.begin + 1..=self.end).collect()
    }
}

impl std::fmt::Display for SyncRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}]", self.begin, self.end)
    }
}

/// Resolve the range between the local watermark and the remote max id
pub fn resolve(local: FeedId, remote: FeedId, max_drift: i64) -> Result<SyncRange> {
    if local > remote {
        return Err(Error::CheckpointInconsistent { local, remote });
    }

    let drift = remote - local;
    if drift > max_drift {
        return Err(Error::DriftExceeded { drift, max_drift });
    }

    Ok(SyncRange {
        begin: local,
        end: remote,
    })
}

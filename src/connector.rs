//! Capabilities the sync engine consumes
//!
//! The engine only talks to the outside world through these traits: the
//! source database, the auth endpoint and the upload endpoint. Production
//! implementations live in `database` and `feishu`; tests substitute fakes.

use crate::auth::IssuedToken;
use crate::config::DriveTarget;
use crate::error::Result;
use crate::transform::{DestinationRecord, RawFeedback};
use crate::types::FeedId;
use async_trait::async_trait;

// ============================================================================
// Source
// ============================================================================

/// Read access to the table of feedback rows
pub trait FeedbackSource {
    /// Highest id currently in the source table (0 if the table is empty)
    fn max_id(&self) -> Result<FeedId>;

    /// Rows with the given ids, ordered by id. Missing ids are skipped.
    fn fetch_by_ids(&self, ids: &[FeedId]) -> Result<Vec<RawFeedback>>;
}

// ============================================================================
// Auth
// ============================================================================

/// Issues tenant access tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange app credentials for a token and its lifetime.
    ///
    /// Transport failures, non-success status codes and unparseable bodies
    /// are all errors; nothing is retried.
    async fn fetch_tenant_token(&self, app_id: &str, app_secret: &str) -> Result<IssuedToken>;
}

// ============================================================================
// Upload
// ============================================================================

/// Creates records in the destination table
#[async_trait]
pub trait RecordUploader: Send + Sync {
    /// Create all `records` in `target`, returning how many were created.
    ///
    /// The batch either succeeds as a whole or the call returns an error.
    async fn batch_create_records(
        &self,
        target: &DriveTarget,
        records: &[DestinationRecord],
        bearer_token: &str,
    ) -> Result<usize>;
}

//! Watermark store implementation
//!
//! Checkpoints live in the `checkpoints` table of the local store. A commit
//! closes the open row and inserts the new open row inside one transaction.

use super::types::{Checkpoint, CheckpointFlag};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::store::{from_epoch_millis, to_sql_timestamp, LocalStore};
use crate::types::FeedId;
use duckdb::params;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const CREATE_CHECKPOINTS: &str = "
    CREATE SEQUENCE IF NOT EXISTS checkpoints_id_seq START 1;
    CREATE TABLE IF NOT EXISTS checkpoints (
        id BIGINT NOT NULL DEFAULT nextval('checkpoints_id_seq'),
        feed_id BIGINT NOT NULL CHECK (feed_id >= 0),
        flag INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_checkpoints_feed_id ON checkpoints (feed_id);
    CREATE INDEX IF NOT EXISTS idx_checkpoints_flag ON checkpoints (flag);
";

/// Persists the last synchronized source id
pub struct WatermarkStore {
    store: LocalStore,
    clock: Arc<dyn Clock>,
    table_ready: AtomicBool,
}

impl WatermarkStore {
    /// Create a watermark store on top of the local store
    pub fn new(store: LocalStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a watermark store with a custom clock for `created_at`
    pub fn with_clock(store: LocalStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            table_ready: AtomicBool::new(false),
        }
    }

    /// Create the checkpoint table and its indexes if they do not exist
    pub fn ensure_table(&self) -> Result<()> {
        if self.table_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        self.store
            .execute_batch(CREATE_CHECKPOINTS)
            .map_err(|e| Error::checkpoint(format!("Failed to create checkpoint table: {e}")))?;
        self.table_ready.store(true, Ordering::Release);
        Ok(())
    }

    /// The open watermark, or `None` if nothing has been synchronized yet
    pub fn open_watermark(&self) -> Result<Option<FeedId>> {
        self.ensure_table()?;
        let conn = self.store.lock();
        let result = conn.query_row(
            "SELECT feed_id FROM checkpoints WHERE flag = 0 ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(feed_id) => Ok(Some(feed_id)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::database(format!(
                "Failed to read open watermark: {e}"
            ))),
        }
    }

    /// The open watermark, with "nothing synchronized yet" read as 0
    pub fn current(&self) -> Result<FeedId> {
        Ok(self.open_watermark()?.unwrap_or(0))
    }

    /// Close the checkpoint at `old` and open a new one at `new`, atomically.
    ///
    /// `old == new` is rejected before anything is written. Any failure
    /// rolls the whole transaction back, leaving the open watermark at `old`.
    pub fn commit(&self, old: FeedId, new: FeedId) -> Result<()> {
        if old == new {
            return Err(Error::InvalidCommit { watermark: new });
        }
        self.ensure_table()?;

        let created_at = to_sql_timestamp(self.clock.now());
        let mut conn = self.store.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::checkpoint(format!("Failed to begin transaction: {e}")))?;

        let closed = tx
            .execute(
                "UPDATE checkpoints SET flag = ? WHERE feed_id = ? AND flag = ?",
                params![
                    CheckpointFlag::Closed.as_i32(),
                    old,
                    CheckpointFlag::Open.as_i32()
                ],
            )
            .map_err(|e| Error::checkpoint(format!("Failed to close checkpoint {old}: {e}")))?;

        if closed == 0 && old != 0 {
            return Err(Error::checkpoint(format!(
                "No open checkpoint at {old}; the watermark moved underneath this run"
            )));
        }

        let still_open: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM checkpoints WHERE flag = ?",
                params![CheckpointFlag::Open.as_i32()],
                |row| row.get(0),
            )
            .map_err(|e| Error::checkpoint(format!("Failed to count open checkpoints: {e}")))?;
        if still_open != 0 {
            return Err(Error::checkpoint(format!(
                "Another checkpoint is open besides {old}"
            )));
        }

        tx.execute(
            "INSERT INTO checkpoints (feed_id, flag, created_at) VALUES (?, ?, CAST(? AS TIMESTAMP))",
            params![new, CheckpointFlag::Open.as_i32(), created_at],
        )
        .map_err(|e| Error::checkpoint(format!("Failed to open checkpoint {new}: {e}")))?;

        tx.commit()
            .map_err(|e| Error::checkpoint(format!("Failed to commit checkpoint: {e}")))?;

        tracing::info!("Watermark committed: {} -> {}", old, new);
        Ok(())
    }

    /// Most recent checkpoints, newest first
    pub fn history(&self, limit: usize) -> Result<Vec<Checkpoint>> {
        self.ensure_table()?;
        let conn = self.store.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, feed_id, flag, epoch_ms(created_at)
             FROM checkpoints ORDER BY id DESC LIMIT {limit}"
        ))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, feed_id, flag, created_ms)| {
                Ok(Checkpoint {
                    id,
                    feed_id,
                    flag: CheckpointFlag::from_i32(flag)?,
                    created_at: from_epoch_millis(created_ms)?,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for WatermarkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkStore")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

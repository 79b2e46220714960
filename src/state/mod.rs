//! Watermark store
//!
//! Tracks how far the sync has progressed so the next run resumes where the
//! last successful one stopped.
//!
//! # Overview
//!
//! The state module provides:
//! - `Checkpoint` - One persisted watermark row (open or closed)
//! - `WatermarkStore` - Reads the open watermark and commits new ones
//!   transactionally in the local store
//!
//! At most one checkpoint is open at any time; it is the resumable position.

mod manager;
mod types;

pub use manager::WatermarkStore;
pub use types::{Checkpoint, CheckpointFlag};

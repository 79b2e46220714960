//! Source database support via DuckDB
//!
//! This module reads the feedback table using DuckDB as the query engine.
//! DuckDB can attach PostgreSQL, MySQL, SQLite and its own database files.

mod engine;

pub use engine::SourceEngine;

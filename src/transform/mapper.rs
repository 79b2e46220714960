//! Raw row to destination record mapping

use super::types::{DestinationRecord, RawFeedback, SUBMISSION_DATE_FORMAT};
use crate::clock::{Clock, SystemClock};
use crate::config::FieldMapping;
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Builds destination records from source rows.
///
/// Apart from reading the clock for the created/modified stamps the mapping
/// is pure: the same row always yields the same fields.
pub struct RecordMapper {
    mapping: FieldMapping,
    clock: Arc<dyn Clock>,
}

impl RecordMapper {
    /// Create a mapper using the wall clock
    pub fn new(mapping: FieldMapping) -> Self {
        Self::with_clock(mapping, Arc::new(SystemClock))
    }

    /// Create a mapper with a custom clock
    pub fn with_clock(mapping: FieldMapping, clock: Arc<dyn Clock>) -> Self {
        Self { mapping, clock }
    }

    /// Field names and constants in use
    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// Map a single row
    pub fn transform(&self, raw: &RawFeedback) -> Result<DestinationRecord> {
        let submitted_at_ms = parse_submission_date(&raw.submission_date)?;
        let now = self.clock.now_millis();

        Ok(DestinationRecord {
            source_id: raw.id,
            category: self.mapping.category.clone(),
            status: self.mapping.status.clone(),
            priority: self.mapping.priority.clone(),
            submitted_at_ms,
            summary: raw.description.clone(),
            description: compose_description(&raw.description, &raw.email),
            parent_links: vec![self.mapping.parent_record_id.clone()],
            created_time: now,
            modified_time: now,
        })
    }

    /// Map rows in input order, failing on the first bad row
    pub fn transform_all(&self, rows: &[RawFeedback]) -> Result<Vec<DestinationRecord>> {
        rows.iter()
            .map(|raw| {
                self.transform(raw).map_err(|e| {
                    tracing::error!("Failed to transform feedback {}: {}", raw.id, e);
                    e
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for RecordMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordMapper")
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS` as UTC into epoch milliseconds
pub fn parse_submission_date(value: &str) -> Result<i64> {
    NaiveDateTime::parse_from_str(value.trim(), SUBMISSION_DATE_FORMAT)
        .map(|dt| dt.and_utc().timestamp_millis())
        .map_err(|e| Error::date_parse(value, e.to_string()))
}

/// Description followed by ` contact: {email}` when an email is present
pub fn compose_description(description: &str, email: &str) -> String {
    let email = email.trim();
    if email.is_empty() {
        description.to_string()
    } else {
        format!("{description} contact: {email}")
    }
}

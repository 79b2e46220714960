//! Source and destination record types

use crate::config::FieldMapping;
use crate::types::{FeedId, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format of the source `add_date` column
pub const SUBMISSION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the source feedback table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFeedback {
    /// Source row id
    pub id: FeedId,
    /// Free text written by the user
    pub description: String,
    /// Contact email, possibly blank
    pub email: String,
    /// Submitting user
    pub user_id: i64,
    /// Submission time as `YYYY-MM-DD HH:MM:SS`
    pub submission_date: String,
}

/// A feedback row in the shape of the destination table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRecord {
    /// Source row this record was built from
    pub source_id: FeedId,
    pub category: String,
    pub status: String,
    pub priority: String,
    /// Submission time, epoch milliseconds
    pub submitted_at_ms: i64,
    /// Raw description
    pub summary: String,
    /// Description with the optional contact suffix
    pub description: String,
    /// Records this one links to as its parent
    pub parent_links: Vec<String>,
    /// Creation time, epoch milliseconds
    pub created_time: i64,
    /// Last modification time, epoch milliseconds
    pub modified_time: i64,
}

impl DestinationRecord {
    /// Column values keyed by destination field name
    pub fn to_fields(&self, mapping: &FieldMapping) -> JsonObject {
        let mut fields = JsonObject::new();
        fields.insert(
            mapping.summary_field.clone(),
            Value::String(self.summary.clone()),
        );
        fields.insert(
            mapping.category_field.clone(),
            Value::String(self.category.clone()),
        );
        fields.insert(
            mapping.status_field.clone(),
            Value::String(self.status.clone()),
        );
        fields.insert(
            mapping.priority_field.clone(),
            Value::String(self.priority.clone()),
        );
        fields.insert(
            mapping.submitted_at_field.clone(),
            Value::from(self.submitted_at_ms),
        );
        fields.insert(
            mapping.detail_field.clone(),
            Value::String(self.description.clone()),
        );
        fields.insert(
            mapping.parent_field.clone(),
            Value::Array(
                self.parent_links
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
        fields
    }
}

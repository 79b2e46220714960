//! Record transformer
//!
//! Turns rows of the source feedback table into records of the destination
//! bitable: fixed category/status/priority, submission date as epoch
//! millis, description with contact suffix and a fixed parent link.

mod mapper;
mod types;

pub use mapper::{compose_description, parse_submission_date, RecordMapper};
pub use types::{DestinationRecord, RawFeedback, SUBMISSION_DATE_FORMAT};

#[cfg(test)]
mod tests;

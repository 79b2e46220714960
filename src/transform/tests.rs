//! Tests for the record transformer

use super::*;
use crate::clock::{Clock, ManualClock};
use crate::config::FieldMapping;
use crate::error::Error;
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const MAY_FIRST_8AM_MS: i64 = 1_714_550_400_000;

fn raw(id: i64, email: &str) -> RawFeedback {
    RawFeedback {
        id,
        description: "Search is slow".to_string(),
        email: email.to_string(),
        user_id: 42,
        submission_date: "2024-05-01 08:00:00".to_string(),
    }
}

fn mapper_at(clock: &ManualClock) -> RecordMapper {
    RecordMapper::with_clock(FieldMapping::default(), Arc::new(clock.clone()))
}

fn frozen_clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
}

#[test]
fn test_transform_builds_destination_record() {
    let clock = frozen_clock();
    let record = mapper_at(&clock).transform(&raw(7, "a@b.com")).unwrap();
    let now = clock.now_millis();

    assert_eq!(
        record,
        DestinationRecord {
            source_id: 7,
            category: "用户需求反馈".to_string(),
            status: "待评估".to_string(),
            priority: "低 - P2".to_string(),
            submitted_at_ms: MAY_FIRST_8AM_MS,
            summary: "Search is slow".to_string(),
            description: "Search is slow contact: a@b.com".to_string(),
            parent_links: vec!["recumeyGcqvGUP".to_string()],
            created_time: now,
            modified_time: now,
        }
    );
}

#[test]
fn test_transform_is_deterministic_apart_from_now() {
    let clock = frozen_clock();
    let mapper = mapper_at(&clock);
    let row = raw(1, "a@b.com");

    let first = mapper.transform(&row).unwrap();
    assert_eq!(mapper.transform(&row).unwrap(), first);

    clock.advance(Duration::seconds(30));
    let later = mapper.transform(&row).unwrap();
    assert_eq!(later.created_time, first.created_time + 30_000);
    assert_eq!(
        DestinationRecord {
            created_time: first.created_time,
            modified_time: first.modified_time,
            ..later
        },
        first
    );
}

#[test]
fn test_whitespace_email_adds_no_suffix() {
    let clock = frozen_clock();
    let record = mapper_at(&clock).transform(&raw(1, "  ")).unwrap();
    assert_eq!(record.description, "Search is slow");
}

#[test]
fn test_email_is_trimmed_in_suffix() {
    assert_eq!(
        compose_description("Crash on start", "  a@b.com \n"),
        "Crash on start contact: a@b.com"
    );
    assert_eq!(compose_description("Crash on start", ""), "Crash on start");
}

#[test]
fn test_parse_submission_date_is_utc() {
    assert_eq!(
        parse_submission_date("2024-05-01 08:00:00").unwrap(),
        MAY_FIRST_8AM_MS
    );
    assert_eq!(parse_submission_date("1970-01-01 00:00:01").unwrap(), 1000);
}

#[test]
fn test_bad_date_is_an_error() {
    let err = parse_submission_date("2024/05/01").unwrap_err();
    match err {
        Error::DateParse { value, .. } => assert_eq!(value, "2024/05/01"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_transform_all_keeps_input_order() {
    let clock = frozen_clock();
    let rows = vec![raw(101, ""), raw(102, "x@y.z"), raw(103, "")];

    let records = mapper_at(&clock).transform_all(&rows).unwrap();
    let ids: Vec<i64> = records.iter().map(|r| r.source_id).collect();
    assert_eq!(ids, vec![101, 102, 103]);
}

#[test]
fn test_transform_all_fails_on_any_bad_row() {
    let clock = frozen_clock();
    let mut bad = raw(102, "");
    bad.submission_date = "yesterday".to_string();
    let rows = vec![raw(101, ""), bad, raw(103, "")];

    let err = mapper_at(&clock).transform_all(&rows).unwrap_err();
    assert!(matches!(err, Error::DateParse { .. }));
}

#[test]
fn test_to_fields_uses_mapping_names() {
    let clock = frozen_clock();
    let mapping = FieldMapping::default();
    let record = mapper_at(&clock).transform(&raw(1, "a@b.com")).unwrap();

    let fields = serde_json::Value::Object(record.to_fields(&mapping));
    assert_eq!(
        fields,
        json!({
            "需求描述": "Search is slow",
            "需求分类": "用户需求反馈",
            "需求状态": "待评估",
            "优先级": "低 - P2",
            "需求提出日期": MAY_FIRST_8AM_MS,
            "需求详细描述（可附文档）": "Search is slow contact: a@b.com",
            "父记录": ["recumeyGcqvGUP"],
        })
    );
}

#[test]
fn test_custom_mapping_constants() {
    let clock = frozen_clock();
    let mapping = FieldMapping {
        category: "Feedback".to_string(),
        parent_record_id: "recParent".to_string(),
        ..FieldMapping::default()
    };
    let mapper = RecordMapper::with_clock(mapping, Arc::new(clock));

    let record = mapper.transform(&raw(1, "")).unwrap();
    assert_eq!(record.category, "Feedback");
    assert_eq!(record.parent_links, vec!["recParent".to_string()]);
}

//! Tests for the Feishu client

use super::*;
use crate::config::{AppCredentials, DriveTarget, FeishuConfig, FieldMapping};
use crate::connector::{RecordUploader, TokenProvider};
use crate::error::Error;
use crate::transform::DestinationRecord;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> FeishuConfig {
    FeishuConfig {
        base_url: server.uri(),
        timeout_secs: 3,
        requests_per_second: 100,
        app: AppCredentials {
            id: "cli_test".to_string(),
            secret: "secret".to_string(),
        },
        drive: target(),
    }
}

fn target() -> DriveTarget {
    DriveTarget {
        base_id: "bascnTest".to_string(),
        table_id: "tblTest".to_string(),
    }
}

fn record(id: i64) -> DestinationRecord {
    DestinationRecord {
        source_id: id,
        category: "用户需求反馈".to_string(),
        status: "待评估".to_string(),
        priority: "低 - P2".to_string(),
        submitted_at_ms: 1_714_550_400_000,
        summary: format!("feedback {id}"),
        description: format!("feedback {id} contact: a@b.com"),
        parent_links: vec!["recumeyGcqvGUP".to_string()],
        created_time: 1_717_243_200_000,
        modified_time: 1_717_243_200_000,
    }
}

fn upload_path() -> String {
    batch_create_path("bascnTest", "tblTest")
}

#[test]
fn test_batch_create_path() {
    assert_eq!(
        batch_create_path("app1", "tbl1"),
        "/open-apis/bitable/v1/apps/app1/tables/tbl1/records/batch_create"
    );
}

#[tokio::test]
async fn test_fetch_tenant_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TENANT_TOKEN_PATH))
        .and(body_json(json!({"app_id": "cli_test", "app_secret": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "ok",
            "tenant_access_token": "t-abc",
            "expire": 7200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FeishuClient::new(&config_for(&server), FieldMapping::default()).unwrap();
    let issued = client.fetch_tenant_token("cli_test", "secret").await.unwrap();

    assert_eq!(issued.token, "t-abc");
    assert_eq!(issued.ttl_seconds, 7200);
}

#[tokio::test]
async fn test_tenant_token_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TENANT_TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 10014,
            "msg": "app secret invalid"
        })))
        .mount(&server)
        .await;

    let client = FeishuClient::new(&config_for(&server), FieldMapping::default()).unwrap();
    let err = client.fetch_tenant_token("cli_test", "bad").await.unwrap_err();

    match err {
        Error::Api { code, message } => {
            assert_eq!(code, 10014);
            assert_eq!(message, "app secret invalid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_tenant_token_unparseable_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TENANT_TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = FeishuClient::new(&config_for(&server), FieldMapping::default()).unwrap();
    let err = client.fetch_tenant_token("cli_test", "secret").await.unwrap_err();

    assert!(matches!(err, Error::JsonParse(_)));
}

#[tokio::test]
async fn test_batch_create_sends_fields_with_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(upload_path()))
        .and(header("authorization", "Bearer t-abc"))
        .and(body_partial_json(json!({
            "records": [{
                "fields": {
                    "需求描述": "feedback 101",
                    "需求详细描述（可附文档）": "feedback 101 contact: a@b.com",
                    "需求提出日期": 1_714_550_400_000_i64,
                    "父记录": ["recumeyGcqvGUP"]
                },
                "created_time": 1_717_243_200_000_i64
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "success",
            "data": {"records": [{"fields": {}, "record_id": "rec1"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FeishuClient::new(&config_for(&server), FieldMapping::default()).unwrap();
    let created = client
        .batch_create_records(&target(), &[record(101)], "t-abc")
        .await
        .unwrap();

    assert_eq!(created, 1);
}

#[tokio::test]
async fn test_batch_create_is_chunked() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": "success"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = FeishuClient::new(&config_for(&server), FieldMapping::default())
        .unwrap()
        .with_batch_size(2);
    let records: Vec<_> = (1..=5).map(record).collect();

    let created = client
        .batch_create_records(&target(), &records, "t-abc")
        .await
        .unwrap();
    assert_eq!(created, 5);
}

#[tokio::test]
async fn test_batch_create_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1254045,
            "msg": "FieldNameNotFound"
        })))
        .mount(&server)
        .await;

    let client = FeishuClient::new(&config_for(&server), FieldMapping::default()).unwrap();
    let err = client
        .batch_create_records(&target(), &[record(1)], "t-abc")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { code: 1254045, .. }));
}

#[tokio::test]
async fn test_batch_create_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(upload_path()))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = FeishuClient::new(&config_for(&server), FieldMapping::default()).unwrap();
    let err = client
        .batch_create_records(&target(), &[record(1)], "t-abc")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(err.is_transport());
}

#[test]
fn test_batch_size_is_clamped() {
    let config = FeishuConfig {
        base_url: "https://open.feishu.cn".to_string(),
        timeout_secs: 3,
        requests_per_second: 5,
        app: AppCredentials {
            id: "cli_test".to_string(),
            secret: "secret".to_string(),
        },
        drive: target(),
    };
    let client = FeishuClient::new(&config, FieldMapping::default()).unwrap();
    assert_eq!(client.batch_size(), 500);
    assert_eq!(client.with_batch_size(0).batch_size(), 1);
}

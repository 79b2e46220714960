//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base_url: impl Into<String>) -> HttpClient {
    HttpClient::new(HttpClientConfig::new(base_url).with_rate_limit(None)).unwrap()
}

#[test]
fn test_http_client_config_defaults() {
    let config = HttpClientConfig::new("https://open.feishu.cn");
    assert_eq!(config.base_url, "https://open.feishu.cn");
    assert_eq!(config.timeout, Duration::from_secs(3));
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::default()));
    assert!(config.user_agent.starts_with("earthworm/"));
}

#[test]
fn test_url_joins_path_onto_base() {
    let client = client_for("https://open.feishu.cn/");
    assert_eq!(
        client.url("/open-apis/auth"),
        "https://open.feishu.cn/open-apis/auth"
    );
    assert_eq!(
        client.url("open-apis/auth"),
        "https://open.feishu.cn/open-apis/auth"
    );
}

#[tokio::test]
async fn test_post_json_sends_body_bearer_and_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items"))
        .and(header("authorization", "Bearer t-123"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_json(json!({"name": "bug"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let response: Value = client
        .post_json("/api/items", &json!({"name": "bug"}), Some("t-123"))
        .await
        .unwrap();

    assert_eq!(response["code"], 0);
}

#[tokio::test]
async fn test_no_bearer_sends_no_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let _: Value = client.post_json("/open", &json!({}), None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fail"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let err = client
        .post_json::<_, Value>("/fail", &json!({}), None)
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_too_many_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/busy-no-header"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let err = client
        .post_json::<_, Value>("/busy", &json!({}), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 7
        }
    ));

    let err = client
        .post_json::<_, Value>("/busy-no-header", &json!({}), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 60
        }
    ));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = HttpClient::new(
        HttpClientConfig::new(server.uri())
            .with_timeout(Duration::from_millis(100))
            .with_rate_limit(None),
    )
    .unwrap();
    let err = client
        .post_json::<_, Value>("/slow", &json!({}), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_ms: 100 }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_stalled_body_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Headers arrive at once, the body never completes
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 64\r\n\r\n{\"code\":",
            )
            .await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let client = HttpClient::new(
        HttpClientConfig::new(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(200))
            .with_rate_limit(None),
    )
    .unwrap();
    let err = client
        .post_json::<_, Value>("/stall", &json!({}), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_ms: 200 }), "{err:?}");
}

#[tokio::test]
async fn test_malformed_json_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let result = client
        .post_json::<_, Value>("/garbage", &json!({}), None)
        .await;

    assert!(matches!(result, Err(Error::JsonParse(_))));
}

#[tokio::test]
async fn test_rate_limited_client_still_sends() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/paced"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(3)
        .mount(&server)
        .await;

    let client = HttpClient::new(
        HttpClientConfig::new(server.uri()).with_rate_limit(Some(RateLimiterConfig::new(100, 3))),
    )
    .unwrap();

    for _ in 0..3 {
        let _: Value = client.post_json("/paced", &json!({}), None).await.unwrap();
    }
}

#[test]
fn test_http_client_debug() {
    let client = client_for("https://open.feishu.cn");
    let debug = format!("{client:?}");
    assert!(debug.contains("HttpClient"));
    assert!(debug.contains("rate_limited"));
}

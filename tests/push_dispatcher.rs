//! Integration tests for the push broker client.
//!
//! A `wiremock` server stands in for the broker. The dispatcher uses a
//! blocking client, so it is built, used and dropped on the blocking pool.

use aquamon_service::config::NotificationConfig;
use aquamon_service::error::DispatchError;
use aquamon_service::notify::{Notification, NotificationDispatcher, PushDispatcher};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/v1/projects/aquamon/messages:send";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config_for(server: &MockServer, access_token: Option<&str>) -> NotificationConfig {
    NotificationConfig {
        endpoint: Some(format!("{}{SEND_PATH}", server.uri())),
        access_token: access_token.map(str::to_string),
        timeout_secs: 5,
        ..NotificationConfig::default()
    }
}

fn alert() -> Notification {
    Notification {
        title: "Sensor Alert".to_string(),
        body: "PH level out of range: 9.0 (allowed 6.5 to 8.5)\nTurbidity out of range: 8.0 NTU (allowed 0.0 NTU to 5.0 NTU)".to_string(),
        topic: "sensor_alerts".to_string(),
    }
}

async fn send_blocking(config: NotificationConfig) -> Result<(), DispatchError> {
    tokio::task::spawn_blocking(move || {
        let dispatcher = PushDispatcher::from_config(&config)?;
        dispatcher.send(&alert())
    })
    .await
    .expect("dispatcher task panicked")
}

// ---------------------------------------------------------------------------
// Request shape
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn test_send_posts_topic_message_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({
            "message": {
                "topic": "sensor_alerts",
                "notification": {
                    "title": "Sensor Alert",
                    "body": "PH level out of range: 9.0 (allowed 6.5 to 8.5)\nTurbidity out of range: 8.0 NTU (allowed 0.0 NTU to 5.0 NTU)"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "msg-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = send_blocking(config_for(&server, Some("secret"))).await;

    assert!(result.is_ok(), "broker accepted the message: {result:?}");
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_without_token_omits_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    send_blocking(config_for(&server, None)).await.unwrap();

    let requests = server.received_requests().await.expect("recording is on");
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0].headers.get("authorization").is_none(),
        "no token configured, no Authorization header"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blank_token_omits_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    send_blocking(config_for(&server, Some(""))).await.unwrap();

    let requests = server.received_requests().await.expect("recording is on");
    assert!(requests[0].headers.get("authorization").is_none());
}

// ---------------------------------------------------------------------------
// Broker responses
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn test_non_success_status_is_rejected_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("broker overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = send_blocking(config_for(&server, Some("secret")))
        .await
        .unwrap_err();

    match err {
        DispatchError::Rejected { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "broker overloaded");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = send_blocking(config_for(&server, Some("expired")))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Rejected { status: 401, .. }));
}

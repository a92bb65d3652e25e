//! End-to-end relay tests
//!
//! The router is driven in-process and the Telegram Bot API is replaced by
//! a local mock server, so no network access or real bot is needed.

use std::io;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

use submission_relay::config::{ServerConfig, Settings, TelegramConfig};
use submission_relay::server::{create_app, AppState};

const TOKEN: &str = "123456:TEST-token";
const CHAT_ID: &str = "-100777";
const SEND_PATH: &str = "/bot123456:TEST-token/sendMessage";

fn app_with(telegram: TelegramConfig) -> Router {
    let settings = Settings {
        telegram,
        ..Settings::default()
    };
    create_app(AppState::new(settings).unwrap())
}

fn configured(server: &ServerGuard) -> TelegramConfig {
    TelegramConfig {
        token: Some(TOKEN.to_string()),
        chat_id: Some(CHAT_ID.to_string()),
        api_base_url: server.url(),
        ..TelegramConfig::default()
    }
}

fn configured_app(server: &ServerGuard) -> Router {
    app_with(configured(server))
}

const SMALL_BODY_LIMIT: usize = 1024;

fn small_limit_app(telegram: TelegramConfig) -> Router {
    let settings = Settings {
        server: ServerConfig {
            body_limit_bytes: SMALL_BODY_LIMIT,
            ..ServerConfig::default()
        },
        telegram,
        ..Settings::default()
    };
    create_app(AppState::new(settings).unwrap())
}

fn oversized_body() -> String {
    json!({ "notes": "x".repeat(SMALL_BODY_LIMIT * 4) }).to_string()
}

/// In-memory log sink shared with a fmt subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn submit(method: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/api/v1/submissions")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Fail-fast paths: nothing is sent upstream
// =============================================================================

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let response = configured_app(&server)
        .oneshot(submit("GET", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_text(response).await, "Method not allowed");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_chat_id_is_configuration_error() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let app = app_with(TelegramConfig {
        token: Some(TOKEN.to_string()),
        chat_id: None,
        api_base_url: server.url(),
        ..TelegramConfig::default()
    });
    let response = app.oneshot(submit("POST", r#"{"a":"b"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.contains("TELEGRAM_CHAT_ID"));
    assert!(!body.contains("TELEGRAM_TOKEN"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_configuration_checked_before_body() {
    let app = app_with(TelegramConfig::default());
    let response = app.oneshot(submit("POST", "not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_text(response).await,
        "Missing TELEGRAM_TOKEN or TELEGRAM_CHAT_ID"
    );
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let response = configured_app(&server)
        .oneshot(submit("POST", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid JSON");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_whitespace_body_is_bad_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let response = configured_app(&server)
        .oneshot(submit("POST", "   "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid JSON");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_oversized_get_is_method_not_allowed() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let response = small_limit_app(configured(&server))
        .oneshot(submit("GET", &oversized_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_text(response).await, "Method not allowed");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_oversized_post_without_chat_id_is_configuration_error() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let response = small_limit_app(TelegramConfig {
        chat_id: None,
        ..configured(&server)
    })
    .oneshot(submit("POST", &oversized_body()))
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Missing TELEGRAM_CHAT_ID");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_oversized_post_is_bad_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let response = small_limit_app(configured(&server))
        .oneshot(submit("POST", &oversized_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_object_json_is_bad_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let response = configured_app(&server)
        .oneshot(submit("POST", "[1,2,3]"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    mock.assert_async().await;
}

// =============================================================================
// Delivery paths
// =============================================================================

#[tokio::test]
async fn test_submission_is_formatted_and_delivered() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"chat_id": CHAT_ID, "parse_mode": "Markdown"})),
            Matcher::Regex("Time: 2024-01-01".to_string()),
            Matcher::Regex(r"\*Loan details:\*\\namount: 500".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
        .expect(1)
        .create_async()
        .await;

    let response = configured_app(&server)
        .oneshot(submit(
            "POST",
            r#"{"loanData":{"amount":"500"},"submittedAt":"2024-01-01"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_body_sends_header_only() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::PartialJson(json!({"text": "*New Order / Submission*"})))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let response = configured_app(&server)
        .oneshot(submit("POST", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_outbound_message_carries_raw_credentials() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("PIN: 9876".to_string()),
            Matcher::Regex("OTP: 123456".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let response = configured_app(&server)
        .oneshot(submit(
            "POST",
            r#"{"loginPhone":"5551234","loginPin":"9876","otp":"123456"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_rejection_surfaces_body_verbatim() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", SEND_PATH)
        .with_status(403)
        .with_body(r#"{"description":"bot blocked"}"#)
        .expect(1)
        .create_async()
        .await;

    let response = configured_app(&server)
        .oneshot(submit("POST", r#"{"name":"Jane"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_text(response).await,
        r#"Telegram error: {"description":"bot blocked"}"#
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_failure_is_server_error_without_token() {
    let app = app_with(TelegramConfig {
        token: Some(TOKEN.to_string()),
        chat_id: Some(CHAT_ID.to_string()),
        api_base_url: "http://127.0.0.1:9".to_string(),
        ..TelegramConfig::default()
    });

    let response = app.oneshot(submit("POST", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.starts_with("Telegram request failed: "));
    assert!(!body.contains(TOKEN));
}

#[tokio::test]
async fn test_overlong_message_is_truncated() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::Regex("…\\(truncated\\)".to_string()))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let app = app_with(TelegramConfig {
        token: Some(TOKEN.to_string()),
        chat_id: Some(CHAT_ID.to_string()),
        api_base_url: server.url(),
        max_message_chars: 100,
        ..TelegramConfig::default()
    });
    let notes = "x".repeat(500);
    let response = app
        .oneshot(submit("POST", &json!({ "notes": notes }).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

// =============================================================================
// Diagnostics
// =============================================================================

#[tokio::test]
async fn test_diagnostic_log_masks_credentials_and_hides_token() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();
    // Current-thread test runtime: every poll happens under this default
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::Regex("PIN: 9876".to_string()))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":3,"text":"PIN: 9876"}}"#)
        .expect(1)
        .create_async()
        .await;

    let response = configured_app(&server)
        .oneshot(submit(
            "POST",
            r#"{"loginPhone":"5551234","loginPin":"9876","otp":"480512","loanData":{"pin":"2468"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;

    let output = logs.contents();
    assert!(output.contains("Submission received"));
    assert!(output.contains("sendMessage accepted"));
    assert!(output.contains(r#""loginPin":"**76""#));
    assert!(output.contains(r#""otp":"****12""#));
    assert!(output.contains(r#""pin":"**68""#));
    assert!(output.contains(r#""loginPhone":"5551234""#));
    assert!(!output.contains(r#""loginPin":"9876""#));
    assert!(!output.contains(r#""otp":"480512""#));
    assert!(!output.contains(r#""pin":"2468""#));
    // The echoed message text is never logged
    assert!(!output.contains("PIN: 9876"));
    assert!(!output.contains(TOKEN));
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_configuration_presence_only() {
    let server = Server::new_async().await;
    let response = configured_app(&server)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(!body.contains(TOKEN));

    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["telegram_configured"], true);
}

#[tokio::test]
async fn test_health_degraded_without_configuration() {
    let response = app_with(TelegramConfig::default())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let health: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["telegram_configured"], false);
}

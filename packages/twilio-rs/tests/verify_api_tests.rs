//! Exercises the Verify client against an in-process stub of the Twilio API.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::post,
    Form, Json, Router,
};
use serde_json::{json, Value};
use twilio::{Channel, TwilioError, TwilioOptions, TwilioService, VerificationStatus};

const SERVICE_SID: &str = "VA_test";
const APPROVED_CODE: &str = "000000";

async fn create_verification(
    Path(sid): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !headers.contains_key("authorization") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": 20003, "message": "Authenticate", "status": 401})),
        );
    }
    let to = form.get("To").cloned().unwrap_or_default();
    if !to.starts_with('+') {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": 60200,
                "message": format!("Invalid parameter `To`: {}", to),
                "more_info": "https://www.twilio.com/docs/errors/60200",
                "status": 400
            })),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "sid": "VE0001",
            "service_sid": sid,
            "to": to,
            "channel": form.get("Channel").cloned().unwrap_or_default(),
            "status": "pending",
            "valid": false
        })),
    )
}

async fn check_verification(
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let approved = form.get("Code").map(String::as_str) == Some(APPROVED_CODE);
    (
        StatusCode::OK,
        Json(json!({
            "sid": "VE0001",
            "to": form.get("To").cloned().unwrap_or_default(),
            "status": if approved { "approved" } else { "pending" },
            "valid": approved
        })),
    )
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/Services/:sid/Verifications", post(create_verification))
        .route("/Services/:sid/VerificationCheck", post(check_verification));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn service(base_url: String) -> TwilioService {
    TwilioService::new(TwilioOptions {
        account_sid: "AC_test".to_string(),
        auth_token: "secret".to_string(),
        service_id: SERVICE_SID.to_string(),
        base_url,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_send_verification_returns_pending_challenge() {
    let twilio = service(spawn_stub().await);

    let verification = twilio
        .send_verification("+919876543210", Channel::Sms)
        .await
        .unwrap();

    assert_eq!(verification.sid, "VE0001");
    assert_eq!(verification.to, "+919876543210");
    assert_eq!(verification.channel, Channel::Sms);
    assert_eq!(verification.status, VerificationStatus::Pending);
}

#[tokio::test]
async fn test_send_verification_surfaces_twilio_message() {
    let twilio = service(spawn_stub().await);

    let err = twilio
        .send_verification("9876543210", Channel::Sms)
        .await
        .unwrap_err();

    match err {
        TwilioError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid parameter `To`: 9876543210");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_check_verification_approved_and_rejected() {
    let twilio = service(spawn_stub().await);

    let approved = twilio
        .check_verification("+919876543210", APPROVED_CODE)
        .await
        .unwrap();
    assert!(approved.status.is_approved());
    assert!(approved.valid);

    let rejected = twilio
        .check_verification("+919876543210", "111111")
        .await
        .unwrap();
    assert_eq!(rejected.status, VerificationStatus::Pending);
    assert!(!rejected.valid);
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_tolerated() {
    let base = format!("{}/", spawn_stub().await);
    let twilio = service(base);

    let verification = twilio
        .send_verification("+919876543210", Channel::Sms)
        .await
        .unwrap();
    assert_eq!(verification.status, VerificationStatus::Pending);
}

#[tokio::test]
async fn test_unreachable_provider_is_request_error() {
    // Nothing listens on port 9 (discard) on loopback in the test environment.
    let twilio = service("http://127.0.0.1:9".to_string());

    let err = twilio
        .check_verification("+919876543210", APPROVED_CODE)
        .await
        .unwrap_err();
    assert!(matches!(err, TwilioError::Request(_)));
}

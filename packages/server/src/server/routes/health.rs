use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct TestResponse {
    message: String,
    timestamp: DateTime<Utc>,
}

/// Liveness check: answers without touching any dependency
pub async fn test_handler() -> Json<TestResponse> {
    info!("Test endpoint hit");
    Json(TestResponse {
        message: "Server is working!".to_string(),
        timestamp: Utc::now(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    directory: DirectoryHealth,
}

#[derive(Serialize)]
pub struct DirectoryHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 OK if the identity directory answers within 5s,
/// 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let directory = match tokio::time::timeout(
        Duration::from_secs(5),
        state.deps.directory.ping(),
    )
    .await
    {
        Ok(Ok(())) => DirectoryHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => DirectoryHealth {
            status: "error".to_string(),
            error: Some(format!("Query failed: {}", e)),
        },
        Err(_) => DirectoryHealth {
            status: "error".to_string(),
            error: Some("Query timeout (>5s)".to_string()),
        },
    };

    let is_healthy = directory.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            directory,
        }),
    )
}

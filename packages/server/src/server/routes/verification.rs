use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{Extension, FromRequest, Request},
    http::{
        header::{CONTENT_TYPE, ORIGIN},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domains::verification::{self, VerificationError};
use crate::server::app::AxumAppState;

#[derive(Debug, Default, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub aadhaar: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub verification_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    pub mobile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub mobile: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for VerificationError {
    fn into_response(self) -> Response {
        let status = match &self {
            VerificationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            VerificationError::NotFound(_) => StatusCode::NOT_FOUND,
            VerificationError::VerificationFailed => StatusCode::BAD_REQUEST,
            VerificationError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Request body sent either as JSON or as an urlencoded form.
///
/// Unparseable bodies are treated as if every field were missing.
pub struct RequestBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for RequestBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let parsed = if is_form {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|rejection| rejection.body_text())
        } else {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|rejection| rejection.body_text())
        };

        Ok(Self(parsed.unwrap_or_else(|error| {
            debug!(error = %error, "Rejected request body");
            T::default()
        })))
    }
}

fn origin(headers: &HeaderMap) -> &str {
    headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}

/// POST /send-otp
pub async fn send_otp_handler(
    Extension(state): Extension<AxumAppState>,
    headers: HeaderMap,
    RequestBody(request): RequestBody<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, VerificationError> {
    info!(origin = %origin(&headers), "Send OTP request received");

    let sent = verification::send_otp(request.aadhaar, &state.deps).await?;

    Ok(Json(SendOtpResponse {
        success: true,
        message: "OTP sent successfully".to_string(),
        mobile: sent.phone_number,
        verification_id: sent.verification_id,
    }))
}

/// POST /verify-otp
pub async fn verify_otp_handler(
    Extension(state): Extension<AxumAppState>,
    headers: HeaderMap,
    RequestBody(request): RequestBody<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, VerificationError> {
    info!(origin = %origin(&headers), "Verify OTP request received");

    let verified =
        verification::verify_otp(request.otp, request.verification_id, &state.deps).await?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        message: "OTP verified successfully".to_string(),
        mobile: verified.phone_number,
    }))
}

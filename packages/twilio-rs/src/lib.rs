// Thin client for the Twilio Verify v2 API (send a challenge, check a code).

use std::collections::HashMap;
use std::time::Duration;

pub mod models;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

pub use crate::models::{ApiErrorBody, Channel, Verification, VerificationCheck, VerificationStatus};

pub const DEFAULT_VERIFY_BASE_URL: &str = "https://verify.twilio.com/v2";

#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("request to Twilio failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Twilio returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse Twilio response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    pub service_id: String,
    /// Verify API root, without trailing slash. Overridden in tests.
    pub base_url: String,
    pub timeout: Duration,
}

impl TwilioOptions {
    pub fn new(account_sid: String, auth_token: String, service_id: String) -> Self {
        Self {
            account_sid,
            auth_token,
            service_id,
            base_url: DEFAULT_VERIFY_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Result<Self, TwilioError> {
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self { options, client })
    }

    /// Start a verification: Twilio generates a code and delivers it over `channel`.
    pub async fn send_verification(
        &self,
        recipient: &str,
        channel: Channel,
    ) -> Result<Verification, TwilioError> {
        let url = format!(
            "{base}/Services/{serv_id}/Verifications",
            base = self.options.base_url.trim_end_matches('/'),
            serv_id = self.options.service_id
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("Channel", channel.as_str());

        let response = self.post_form(&url, &form_body).await?;
        let verification: Verification = decode(response).await?;

        tracing::debug!(
            sid = %verification.sid,
            status = ?verification.status,
            "Twilio verification created"
        );
        Ok(verification)
    }

    /// Check a user-supplied code against the pending verification for `recipient`.
    ///
    /// A wrong code is not an error: Twilio answers 200 with a non-approved status.
    pub async fn check_verification(
        &self,
        recipient: &str,
        code: &str,
    ) -> Result<VerificationCheck, TwilioError> {
        let url = format!(
            "{base}/Services/{serv_id}/VerificationCheck",
            base = self.options.base_url.trim_end_matches('/'),
            serv_id = self.options.service_id
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("Code", code);

        let response = self.post_form(&url, &form_body).await?;
        decode(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form_body: &HashMap<&str, &str>,
    ) -> Result<Response, TwilioError> {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(form_body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %error_body, "Twilio error response");

        let message = serde_json::from_str::<ApiErrorBody>(&error_body)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });

        Err(TwilioError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TwilioError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| TwilioError::Decode(e.to_string()))
}

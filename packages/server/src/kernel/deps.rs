use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use twilio::{TwilioError, TwilioService};

use crate::domains::verification::models::Identity;
use crate::domains::verification::{IdentityDirectory, PendingVerifications};
use crate::kernel::{ApprovalStatus, BaseDirectory, BaseOtpProvider, ChallengeHandle, Channel};

// =============================================================================
// TwilioService Adapter (implements BaseOtpProvider trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseOtpProvider trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

/// Keep Twilio's own wording for API errors so callers see e.g.
/// "Invalid parameter `To`" rather than our wrapper text.
fn provider_error(err: TwilioError) -> anyhow::Error {
    match err {
        TwilioError::Api { message, .. } => anyhow::anyhow!(message),
        other => anyhow::anyhow!(other),
    }
}

#[async_trait]
impl BaseOtpProvider for TwilioAdapter {
    async fn send_challenge(&self, phone_number: &str, channel: Channel) -> Result<ChallengeHandle> {
        let verification = self
            .0
            .send_verification(phone_number, channel)
            .await
            .map_err(provider_error)?;

        Ok(ChallengeHandle {
            sid: verification.sid,
            status: verification.status.as_str().to_string(),
        })
    }

    async fn check_challenge(&self, phone_number: &str, code: &str) -> Result<ApprovalStatus> {
        let check = self
            .0
            .check_verification(phone_number, code)
            .await
            .map_err(provider_error)?;

        if check.status.is_approved() {
            Ok(ApprovalStatus::Approved)
        } else {
            Ok(ApprovalStatus::Rejected(check.status.as_str().to_string()))
        }
    }
}

// =============================================================================
// Postgres Directory (implements BaseDirectory trait)
// =============================================================================

pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseDirectory for PostgresDirectory {
    async fn find_mobile(&self, aadhaar: &str) -> Result<Option<String>> {
        let identity = Identity::find_by_aadhaar(aadhaar, &self.pool).await?;
        Ok(identity.map(|identity| identity.mobile))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub directory: IdentityDirectory,
    pub otp_provider: Arc<dyn BaseOtpProvider>,
    pub pending: Arc<dyn PendingVerifications>,
}

impl ServerDeps {
    pub fn new(
        directory: IdentityDirectory,
        otp_provider: Arc<dyn BaseOtpProvider>,
        pending: Arc<dyn PendingVerifications>,
    ) -> Self {
        Self {
            directory,
            otp_provider,
            pending,
        }
    }
}

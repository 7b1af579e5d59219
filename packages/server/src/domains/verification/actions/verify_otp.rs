//! Verify OTP action

use tracing::{error, info};
use uuid::Uuid;

use crate::domains::verification::errors::VerificationError;
use crate::domains::verification::models::mask_phone;
use crate::domains::verification::pending::CorrelationMode;
use crate::domains::verification::types::OtpVerified;
use crate::kernel::{ApprovalStatus, ServerDeps};

/// Check `otp` with the provider against the pending phone number.
///
/// In `shared` mode `verification_id` is ignored and the check runs against
/// whatever number the most recent send wrote, whoever sent it.
pub async fn verify_otp(
    otp: Option<String>,
    verification_id: Option<String>,
    deps: &ServerDeps,
) -> Result<OtpVerified, VerificationError> {
    let otp = otp
        .filter(|code| !code.is_empty())
        .ok_or_else(|| VerificationError::invalid("OTP is required"))?;

    let verification_id = match deps.pending.mode() {
        CorrelationMode::Shared => None,
        CorrelationMode::Token => parse_verification_id(verification_id)?,
    };

    let phone_number = deps
        .pending
        .lookup(verification_id)
        .ok_or_else(|| VerificationError::invalid("Please send OTP first"))?;

    let status = deps
        .otp_provider
        .check_challenge(&phone_number, &otp)
        .await
        .map_err(|e| {
            error!(phone = %mask_phone(&phone_number), error = %e, "OTP check failed");
            VerificationError::server(e)
        })?;

    match status {
        ApprovalStatus::Approved => {
            deps.pending.complete(verification_id);
            info!(phone = %mask_phone(&phone_number), "OTP verified");
            Ok(OtpVerified { phone_number })
        }
        ApprovalStatus::Rejected(status) => {
            info!(phone = %mask_phone(&phone_number), status = %status, "OTP rejected");
            Err(VerificationError::VerificationFailed)
        }
    }
}

fn parse_verification_id(raw: Option<String>) -> Result<Option<Uuid>, VerificationError> {
    match raw.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        None => Ok(None),
        Some(id) => Uuid::parse_str(id)
            .map(Some)
            .map_err(|_| VerificationError::invalid("verification_id is invalid")),
    }
}

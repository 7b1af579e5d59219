//! Send OTP action

use tracing::{error, info, warn};

use crate::domains::verification::errors::VerificationError;
use crate::domains::verification::models::mask_phone;
use crate::domains::verification::types::OtpSent;
use crate::kernel::{Channel, ServerDeps};

/// Look up the phone registered for `aadhaar` and have the provider send it a code.
///
/// The pending record is written before the provider call, so a failed send
/// still leaves it pointing at this number.
pub async fn send_otp(
    aadhaar: Option<String>,
    deps: &ServerDeps,
) -> Result<OtpSent, VerificationError> {
    let aadhaar = aadhaar
        .filter(|a| !a.is_empty())
        .ok_or_else(|| VerificationError::invalid("Aadhaar number is required"))?;

    // 1. Directory lookup (normalized at the directory boundary)
    let phone_number = deps
        .directory
        .find_by_id(&aadhaar)
        .await
        .map_err(|e| {
            error!(error = %e, "Directory lookup failed");
            VerificationError::server(e)
        })?
        .ok_or_else(|| {
            info!("No identity registered for Aadhaar number");
            VerificationError::NotFound("User not found in database".to_string())
        })?;

    // 2. Record the pending verification
    let verification_id = deps.pending.begin(&phone_number);

    // 3. Ask the provider to deliver a code
    info!(phone = %mask_phone(&phone_number), "Sending OTP");
    let challenge = deps
        .otp_provider
        .send_challenge(&phone_number, Channel::Sms)
        .await
        .map_err(|e| {
            warn!(phone = %mask_phone(&phone_number), error = %e, "Failed to send OTP");
            VerificationError::server(e)
        })?;

    info!(
        phone = %mask_phone(&phone_number),
        sid = %challenge.sid,
        status = %challenge.status,
        "OTP sent successfully"
    );

    Ok(OtpSent {
        phone_number,
        verification_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::verification::{IdentityDirectory, SharedSlot, TokenStore};
    use crate::kernel::test_dependencies::{MockDirectory, MockOtpProvider};
    use std::sync::Arc;

    fn deps_with(directory: MockDirectory, provider: MockOtpProvider) -> ServerDeps {
        ServerDeps::new(
            IdentityDirectory::new(Arc::new(directory), "+91"),
            Arc::new(provider),
            Arc::new(SharedSlot::new()),
        )
    }

    #[tokio::test]
    async fn test_sends_to_normalized_number() {
        let provider = MockOtpProvider::new();
        let deps = deps_with(
            MockDirectory::new().with_identity("123456789012", "9876543210"),
            provider.clone(),
        );

        let sent = send_otp(Some("123456789012".to_string()), &deps).await.unwrap();

        assert_eq!(sent.phone_number, "+919876543210");
        assert!(sent.verification_id.is_none());
        assert_eq!(provider.sends().len(), 1);
        assert_eq!(provider.sends()[0].phone_number, "+919876543210");
        assert_eq!(provider.sends()[0].channel, Channel::Sms);
        assert_eq!(deps.pending.lookup(None).as_deref(), Some("+919876543210"));
    }

    #[tokio::test]
    async fn test_missing_or_empty_aadhaar_is_invalid() {
        let directory = MockDirectory::new();
        let deps = deps_with(directory.clone(), MockOtpProvider::new());

        for input in [None, Some(String::new())] {
            let err = send_otp(input, &deps).await.unwrap_err();
            assert_eq!(
                err,
                VerificationError::InvalidRequest("Aadhaar number is required".to_string())
            );
        }
        assert!(directory.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_aadhaar_is_looked_up_verbatim() {
        let directory = MockDirectory::new().with_identity("123456789012", "9876543210");
        let provider = MockOtpProvider::new();
        let deps = deps_with(directory.clone(), provider.clone());

        for input in ["   ", " 123456789012 "] {
            let err = send_otp(Some(input.to_string()), &deps).await.unwrap_err();
            assert_eq!(
                err,
                VerificationError::NotFound("User not found in database".to_string())
            );
        }

        assert_eq!(directory.lookups(), vec!["   ", " 123456789012 "]);
        assert!(provider.sends().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_aadhaar_does_not_send() {
        let provider = MockOtpProvider::new();
        let deps = deps_with(MockDirectory::new(), provider.clone());

        let err = send_otp(Some("000000000000".to_string()), &deps).await.unwrap_err();

        assert_eq!(
            err,
            VerificationError::NotFound("User not found in database".to_string())
        );
        assert!(provider.sends().is_empty());
        assert!(deps.pending.lookup(None).is_none());
    }

    #[tokio::test]
    async fn test_directory_failure_is_server_error() {
        let provider = MockOtpProvider::new();
        let deps = deps_with(MockDirectory::new().failing("pool timed out"), provider.clone());

        let err = send_otp(Some("123456789012".to_string()), &deps).await.unwrap_err();

        assert_eq!(err, VerificationError::ServerError("pool timed out".to_string()));
        assert!(provider.sends().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_pending_number() {
        let deps = deps_with(
            MockDirectory::new().with_identity("123456789012", "9876543210"),
            MockOtpProvider::new().with_send_failure("Max send attempts reached"),
        );

        let err = send_otp(Some("123456789012".to_string()), &deps).await.unwrap_err();

        assert_eq!(
            err,
            VerificationError::ServerError("Max send attempts reached".to_string())
        );
        assert_eq!(deps.pending.lookup(None).as_deref(), Some("+919876543210"));
    }

    #[tokio::test]
    async fn test_token_mode_issues_id() {
        let deps = ServerDeps::new(
            IdentityDirectory::new(
                Arc::new(MockDirectory::new().with_identity("123456789012", "9876543210")),
                "+91",
            ),
            Arc::new(MockOtpProvider::new()),
            Arc::new(TokenStore::new(std::time::Duration::from_secs(60))),
        );

        let sent = send_otp(Some("123456789012".to_string()), &deps).await.unwrap();

        let id = sent.verification_id.expect("token mode issues an id");
        assert_eq!(deps.pending.lookup(Some(id)).as_deref(), Some("+919876543210"));
    }
}

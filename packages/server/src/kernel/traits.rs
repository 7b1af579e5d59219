// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Verification rules live in domains/verification and use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseDirectory, BaseOtpProvider)

use anyhow::Result;
use async_trait::async_trait;

pub use twilio::Channel;

// =============================================================================
// Directory Trait (Infrastructure - identity lookup)
// =============================================================================

#[async_trait]
pub trait BaseDirectory: Send + Sync {
    /// Raw mobile number stored for an Aadhaar number, as provisioned
    async fn find_mobile(&self, aadhaar: &str) -> Result<Option<String>>;

    /// Round-trip to the backing store
    async fn ping(&self) -> Result<()>;
}

// =============================================================================
// OTP Provider Trait (Infrastructure - SMS/OTP)
// =============================================================================

/// Provider-side record of a sent challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeHandle {
    pub sid: String,
    pub status: String,
}

/// Outcome of checking a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalStatus {
    Approved,
    /// Any non-approved provider status (`pending`, `canceled`, ...)
    Rejected(String),
}

#[async_trait]
pub trait BaseOtpProvider: Send + Sync {
    /// Ask the provider to generate and deliver a code
    async fn send_challenge(&self, phone_number: &str, channel: Channel) -> Result<ChallengeHandle>;

    /// Check a submitted code against the pending challenge for a number
    async fn check_challenge(&self, phone_number: &str, code: &str) -> Result<ApprovalStatus>;
}

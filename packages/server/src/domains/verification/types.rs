//! Verification domain data types
//!
//! Simple, serializable types returned by verification actions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of starting a verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSent {
    /// Normalized phone number the code was sent to
    pub phone_number: String,
    /// Per-attempt id, only issued in `token` correlation mode
    pub verification_id: Option<Uuid>,
}

/// Result of a successful code check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerified {
    pub phone_number: String,
}

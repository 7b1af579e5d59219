use serde::{Deserialize, Serialize};

/// Delivery channel for a Verify challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Call,
    Email,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Call => "call",
            Channel::Email => "email",
            Channel::Whatsapp => "whatsapp",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported by Twilio Verify for a verification or a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Canceled,
    MaxAttemptsReached,
    Deleted,
    Failed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl VerificationStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, VerificationStatus::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Canceled => "canceled",
            VerificationStatus::MaxAttemptsReached => "max_attempts_reached",
            VerificationStatus::Deleted => "deleted",
            VerificationStatus::Failed => "failed",
            VerificationStatus::Expired => "expired",
            VerificationStatus::Unknown => "unknown",
        }
    }
}

/// Response from `POST /Services/{sid}/Verifications`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub sid: String,
    pub to: String,
    pub channel: Channel,
    pub status: VerificationStatus,
    #[serde(default)]
    pub valid: bool,
}

/// Response from `POST /Services/{sid}/VerificationCheck`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationCheck {
    #[serde(default)]
    pub sid: Option<String>,
    pub to: String,
    pub status: VerificationStatus,
    #[serde(default)]
    pub valid: bool,
}

/// Error payload Twilio returns alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u32>,
    pub message: String,
    #[serde(default)]
    pub more_info: Option<String>,
}

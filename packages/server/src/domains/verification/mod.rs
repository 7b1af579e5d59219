//! Verification domain - proves control of the phone number registered
//! against an Aadhaar number, via a provider-delivered OTP.
//!
//! Flow:
//!   POST /send-otp → directory lookup → pending record → provider send
//!   POST /verify-otp → pending lookup → provider check
//!
//! Correlating the two calls is delegated to a [`PendingVerifications`] store.
//! The default `shared` store is one process-wide slot (last writer wins, no
//! caller isolation); the `token` store issues a per-attempt id with expiry.

pub mod actions;
pub mod directory;
pub mod errors;
pub mod models;
pub mod pending;
pub mod types;

pub use actions::{send_otp, verify_otp};
pub use directory::IdentityDirectory;
pub use errors::VerificationError;
pub use pending::{CorrelationMode, PendingVerifications, SharedSlot, TokenStore};
pub use types::{OtpSent, OtpVerified};

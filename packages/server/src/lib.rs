// Aadhaar phone verification - API Core
//
// Proves control of the mobile number registered against an Aadhaar number
// by sending an OTP through Twilio Verify and checking it.
// Architecture follows the domain/kernel/server split: domains/ holds the
// verification rules, kernel/ the infrastructure traits, server/ the HTTP layer.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;

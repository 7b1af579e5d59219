/// Caller-facing failures of the verification flow.
///
/// Each variant maps to one HTTP status; see `server::routes::verification`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// Missing or malformed input, or no pending verification to check against
    #[error("{0}")]
    InvalidRequest(String),

    /// No identity registered for the supplied Aadhaar number
    #[error("{0}")]
    NotFound(String),

    /// The provider did not approve the submitted code
    #[error("Invalid OTP")]
    VerificationFailed,

    /// Directory or provider failure, carrying the underlying message
    #[error("Server error: {0}")]
    ServerError(String),
}

impl VerificationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn server(err: impl std::fmt::Display) -> Self {
        Self::ServerError(err.to_string())
    }
}

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::verification::CorrelationMode;

const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:5173,http://127.0.0.1:5173,http://localhost:3000";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_verify_service_sid: String,
    pub twilio_api_base_url: String,
    pub allowed_origins: Vec<String>,
    pub production: bool,
    pub phone_country_code: String,
    pub correlation_mode: CorrelationMode,
    pub verification_ttl: Duration,
    pub provider_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Credentials are mandatory: a missing or blank value refuses startup
    /// instead of talking to the provider with empty credentials.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                Some(_) => bail!("{} must not be empty", key),
                None => bail!("{} must be set", key),
            }
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let allowed_origins = optional("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let correlation_mode = CorrelationMode::from_str(&optional(
            "VERIFICATION_CORRELATION",
            "shared",
        ))
        .context("VERIFICATION_CORRELATION must be `shared` or `token`")?;

        let phone_country_code = optional("PHONE_COUNTRY_CODE", "+91");
        if !phone_country_code.starts_with('+') {
            bail!("PHONE_COUNTRY_CODE must start with '+'");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: optional("PORT", "3000")
                .parse()
                .context("PORT must be a valid number")?,
            twilio_account_sid: required("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: required("TWILIO_AUTH_TOKEN")?,
            twilio_verify_service_sid: required("TWILIO_VERIFY_SERVICE_SID")?,
            twilio_api_base_url: optional("TWILIO_API_BASE_URL", twilio::DEFAULT_VERIFY_BASE_URL),
            allowed_origins,
            production: optional("APP_ENV", "development").eq_ignore_ascii_case("production"),
            phone_country_code,
            correlation_mode,
            verification_ttl: Duration::from_secs(
                optional("VERIFICATION_TTL_SECS", "600")
                    .parse()
                    .context("VERIFICATION_TTL_SECS must be a number of seconds")?,
            ),
            provider_timeout: Duration::from_secs(
                optional("PROVIDER_TIMEOUT_SECS", "10")
                    .parse()
                    .context("PROVIDER_TIMEOUT_SECS must be a number of seconds")?,
            ),
        })
    }
}

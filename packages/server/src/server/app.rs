//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use twilio::{TwilioOptions, TwilioService};

use crate::config::Config;
use crate::domains::verification::{
    CorrelationMode, IdentityDirectory, PendingVerifications, SharedSlot, TokenStore,
};
use crate::kernel::{PostgresDirectory, ServerDeps, TwilioAdapter};
use crate::server::middleware::cors_layer;
use crate::server::routes::{health_handler, send_otp_handler, test_handler, verify_otp_handler};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
}

/// Pending-verification store for the configured correlation mode
pub fn pending_store(config: &Config) -> Arc<dyn PendingVerifications> {
    match config.correlation_mode {
        CorrelationMode::Shared => Arc::new(SharedSlot::new()),
        CorrelationMode::Token => Arc::new(TokenStore::new(config.verification_ttl)),
    }
}

/// Wire production dependencies: Postgres directory + Twilio Verify
pub fn build_server_deps(pool: PgPool, config: &Config) -> Result<ServerDeps> {
    let twilio_options = TwilioOptions {
        account_sid: config.twilio_account_sid.clone(),
        auth_token: config.twilio_auth_token.clone(),
        service_id: config.twilio_verify_service_sid.clone(),
        base_url: config.twilio_api_base_url.clone(),
        timeout: config.provider_timeout,
    };
    let twilio = Arc::new(
        TwilioService::new(twilio_options).context("Failed to build Twilio client")?,
    );

    let directory = IdentityDirectory::new(
        Arc::new(PostgresDirectory::new(pool)),
        config.phone_country_code.clone(),
    );

    Ok(ServerDeps::new(
        directory,
        Arc::new(TwilioAdapter::new(twilio)),
        pending_store(config),
    ))
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, cors: CorsLayer) -> Router {
    let app_state = AxumAppState {
        deps: Arc::new(deps),
    };

    Router::new()
        .route("/test", get(test_handler))
        .route("/health", get(health_handler))
        .route("/send-otp", post(send_otp_handler))
        .route("/verify-otp", post(verify_otp_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Router for a loaded configuration
pub fn build_app_from_config(pool: PgPool, config: &Config) -> Result<Router> {
    let deps = build_server_deps(pool, config)?;
    let cors = cors_layer(&config.allowed_origins, config.production);
    Ok(build_app(deps, cors))
}

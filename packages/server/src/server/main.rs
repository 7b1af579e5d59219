// Main entry point for API server

use std::time::Duration;

use aadhaar_verify::{server::build_app_from_config, Config};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,aadhaar_verify=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Aadhaar verification API");

    // Load configuration (refuses to start without provider credentials)
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        correlation = ?config.correlation_mode,
        production = config.production,
        "Configuration loaded"
    );
    if config.correlation_mode == aadhaar_verify::domains::verification::CorrelationMode::Shared {
        tracing::warn!(
            "Shared correlation mode: concurrent callers share one pending verification"
        );
    }

    // Connect to the identity directory. A failure here is not fatal: the pool
    // keeps retrying lazily and directory-backed requests answer 500 meanwhile.
    tracing::info!("Connecting to database...");
    let pool_options = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5));
    let pool = match pool_options.clone().connect(&config.database_url).await {
        Ok(pool) => {
            tracing::info!("Database connected");

            tracing::info!("Running database migrations...");
            match sqlx::migrate!("./migrations").run(&pool).await {
                Ok(()) => tracing::info!("Migrations complete"),
                Err(e) => tracing::error!(error = %e, "Failed to run migrations"),
            }
            pool
        }
        Err(e) => {
            tracing::error!(error = %e, "Database connection failed; continuing without directory");
            pool_options
                .connect_lazy(&config.database_url)
                .context("DATABASE_URL is not a valid connection string")?
        }
    };

    // Build application
    let app = build_app_from_config(pool, &config)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Test endpoint: http://localhost:{}/test", config.port);
    tracing::info!(allowed_origins = ?config.allowed_origins, "CORS allow-list");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

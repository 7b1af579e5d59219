//! Provision the identity directory with the mock Aadhaar records.

use aadhaar_verify::domains::verification::models::{Identity, MOCK_IDENTITIES};
use anyhow::{Context, Result};
use clap::Parser;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "seed_directory")]
#[command(about = "Seed the identities table with mock Aadhaar records")]
struct Cli {
    /// Delete every existing identity before inserting
    #[arg(long)]
    reset: bool,

    /// Database URL (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let database_url = match cli.database_url {
        Some(url) => url,
        None => {
            let _ = dotenvy::dotenv();
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?
        }
    };

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    println!("✓ Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    if cli.reset {
        let deleted = Identity::delete_all(&pool).await?;
        println!("✓ Removed {} existing identities", deleted);
    }

    for (aadhaar, mobile) in MOCK_IDENTITIES {
        Identity::upsert(aadhaar, mobile, &pool)
            .await
            .with_context(|| format!("Failed to insert identity {}", aadhaar))?;
    }

    let total = Identity::count(&pool).await?;
    println!(
        "✓ Seeded {} identities ({} total in directory)",
        MOCK_IDENTITIES.len(),
        total
    );

    Ok(())
}

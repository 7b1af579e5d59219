use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Identity - maps an Aadhaar number to the mobile number registered with it
///
/// Rows are provisioned out of band (see the `seed_directory` binary); the
/// verification flow only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Identity {
    pub aadhaar: String,
    pub mobile: String,
    pub created_at: DateTime<Utc>,
}

/// Mock identities used to provision development and test directories.
pub const MOCK_IDENTITIES: &[(&str, &str)] = &[
    ("123456789012", "9876543210"),
    ("234567890123", "8765432109"),
    ("345678901234", "7654321098"),
    ("456789012345", "6543210987"),
    ("567890123456", "9123456780"),
    ("678901234567", "9012345678"),
    ("789012345678", "8123456709"),
    ("890123456789", "7012345678"),
    ("901234567890", "6213456789"),
    ("112233445566", "9988776655"),
];

// =============================================================================
// SQL Queries
// =============================================================================

impl Identity {
    /// Find identity by Aadhaar number
    pub async fn find_by_aadhaar(aadhaar: &str, pool: &PgPool) -> Result<Option<Self>> {
        let identity =
            sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE aadhaar = $1")
                .bind(aadhaar)
                .fetch_optional(pool)
                .await?;
        Ok(identity)
    }

    /// Insert or replace the mobile number for an Aadhaar number
    pub async fn upsert(aadhaar: &str, mobile: &str, pool: &PgPool) -> Result<Self> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO identities (aadhaar, mobile)
            VALUES ($1, $2)
            ON CONFLICT (aadhaar) DO UPDATE SET mobile = EXCLUDED.mobile
            RETURNING *
            "#,
        )
        .bind(aadhaar)
        .bind(mobile)
        .fetch_one(pool)
        .await?;
        Ok(identity)
    }

    /// Remove every identity, returning how many rows were deleted
    pub async fn delete_all(pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM identities").execute(pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM identities")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

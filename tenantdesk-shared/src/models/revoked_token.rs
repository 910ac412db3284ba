/// Session token blocklist
///
/// Logout records the token's `jti` here until the token would have expired
/// anyway; the authorization guard rejects any token whose `jti` is listed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE revoked_tokens (
///     jti UUID PRIMARY KEY,
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct RevokedToken;

impl RevokedToken {
    /// Adds a token ID to the blocklist; revoking twice is a no-op
    pub async fn insert(
        pool: &PgPool,
        jti: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn exists(pool: &PgPool, jti: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Drops entries whose tokens have expired by `now`
    ///
    /// # Returns
    ///
    /// Number of rows removed
    pub async fn purge_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

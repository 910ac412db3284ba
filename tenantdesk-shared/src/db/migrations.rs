/// Schema migrations
///
/// The SQL under `migrations/` at the workspace root is embedded at compile
/// time. Each step is a reversible `{timestamp}_{name}.up.sql` /
/// `.down.sql` pair; the tenants table comes first because every other table
/// references it.
///
/// # Example
///
/// ```no_run
/// use tenantdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use tenantdesk_shared::db::migrations::{ensure_database_exists, run_migrations};
///
/// # async fn example(url: String) -> Result<(), Box<dyn std::error::Error>> {
/// ensure_database_exists(&url).await?;
/// let pool = create_pool(DatabaseConfig::new(url)).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{
    migrate::{MigrateDatabase, MigrateError, Migrator},
    postgres::PgPool,
    Postgres,
};
use tracing::{error, info};

static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Applies every pending migration; already applied steps are skipped
///
/// # Errors
///
/// Fails if a step errors or an applied migration was edited afterwards
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await.map_err(|e| {
        error!(error = %e, "Schema migration failed");
        e
    })?;

    info!(
        migrations = MIGRATOR.iter().count(),
        "Schema is up to date"
    );
    Ok(())
}

/// Creates the database named in `database_url` when missing
///
/// For local development and the PostgreSQL test suite.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        return Ok(());
    }

    info!("Creating missing database");
    Postgres::create_database(database_url).await
}

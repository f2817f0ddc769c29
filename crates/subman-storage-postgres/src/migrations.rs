//! Database migration system for the subscription store
//!
//! Provides versioned schema migrations with tracking to ensure migrations
//! are applied exactly once and in the correct order.

use sqlx::PgPool;
use subman_core::{Error, Result};
use tracing::{debug, info};

/// Represents a single database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique version number (must be sequential)
    pub version: i32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to execute for this migration
    pub up_sql: &'static str,
}

/// All migrations in order
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create subscription table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS subscription (
                id BIGSERIAL PRIMARY KEY,
                service_name TEXT NOT NULL,
                price BIGINT NOT NULL CHECK (price > 0),
                user_id UUID NOT NULL,

                -- Billing months, stored as the first day of the month
                start_date DATE NOT NULL,
                end_date DATE,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT subscription_end_after_start
                    CHECK (end_date IS NULL OR end_date >= start_date)
            )
        "#,
    },
    Migration {
        version: 2,
        description: "Create subscription indexes",
        up_sql: r#"
            CREATE INDEX IF NOT EXISTS idx_subscription_user
            ON subscription(user_id);

            CREATE INDEX IF NOT EXISTS idx_subscription_period
            ON subscription(start_date, end_date);

            CREATE INDEX IF NOT EXISTS idx_subscription_created
            ON subscription(created_at DESC)
        "#,
    },
];

/// Run all pending migrations
///
/// Creates a `schema_migrations` table to track which migrations have been applied,
/// then runs any migrations that haven't been applied yet.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database(format!("Failed to create schema_migrations table: {}", e)))?;

    let applied_versions: Vec<i32> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to fetch applied migrations: {}", e)))?;

    debug!(
        "Found {} applied migrations: {:?}",
        applied_versions.len(),
        applied_versions
    );

    for migration in pending(&applied_versions) {
        info!(
            "Applying migration {}: {}",
            migration.version, migration.description
        );

        // Multi-statement migrations need the simple query protocol
        sqlx::raw_sql(migration.up_sql)
            .execute(pool)
            .await
            .map_err(|e| {
                Error::Database(format!(
                    "Failed to apply migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query(
            "INSERT INTO schema_migrations (version, description) VALUES ($1, $2)
                ON CONFLICT (version) DO NOTHING",
        )
        .bind(migration.version)
        .bind(migration.description)
        .execute(pool)
        .await
        .map_err(|e| {
            Error::Database(format!(
                "Failed to record migration {}: {}",
                migration.version, e
            ))
        })?;

        info!(
            "Successfully applied migration {}: {}",
            migration.version, migration.description
        );
    }

    Ok(())
}

/// Migrations not yet recorded in `applied_versions`, in version order
fn pending(applied_versions: &[i32]) -> impl Iterator<Item = &'static Migration> + '_ {
    MIGRATIONS
        .iter()
        .filter(move |m| !applied_versions.contains(&m.version))
}

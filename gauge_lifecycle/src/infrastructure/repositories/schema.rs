// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite schema helpers shared by the stores and the integration tests.
//!
//! Applies migrations on start-up so tests and embedding services see a
//! consistent database.

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::infrastructure::config::CoreSettings;

/// Runs pending migrations against the provided SQLite pool.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Ensuring database schema is up to date");

    // sqlx tracks applied migrations; re-running is a no-op.
    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Database schema is up to date");
    Ok(())
}

/// Creates the SQLite database file if it doesn't exist.
///
/// `SqlitePool::connect` fails on a missing file unless the URL opts into
/// creation, so call this first when pointing at a fresh path.
pub async fn create_database_if_missing(database_url: &str) -> Result<(), sqlx::Error> {
    if !sqlx::Sqlite::database_exists(database_url).await? {
        debug!("Database does not exist, creating: {}", database_url);
        sqlx::Sqlite::create_database(database_url).await?;
        info!("Created new SQLite database: {}", database_url);
    } else {
        debug!("Database already exists: {}", database_url);
    }
    Ok(())
}

/// Creates the database when missing, connects a pool with the configured
/// acquire timeout, and runs migrations. The one-call start-up path.
pub async fn initialize_database(
    database_url: &str,
    settings: &CoreSettings,
) -> Result<SqlitePool, sqlx::Error> {
    create_database_if_missing(database_url).await?;

    let pool = SqlitePoolOptions::new()
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await?;

    ensure_schema(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory SQLite is per-connection; a single-connection pool keeps
    /// the migrated schema visible to every query.
    async fn in_memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_in_memory_database_gets_all_tables() {
        let pool = in_memory_pool().await;

        for table in [
            "gauges",
            "thread_specifications",
            "hand_tool_specifications",
            "large_equipment_specifications",
            "calibration_standard_specifications",
            "active_checkouts",
            "calibration_batches",
            "batch_members",
            "certificates",
            "calibration_schedules",
            "audit_log",
            "audit_archive",
            "audit_chain_tip",
            "set_id_history",
        ] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_chain_tip_row_seeded() {
        let pool = in_memory_pool().await;
        let (last_seq, last_hash): (i64, String) =
            sqlx::query_as("SELECT last_seq, last_hash FROM audit_chain_tip WHERE id = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(last_seq, 0);
        assert_eq!(last_hash, "");
    }

    #[tokio::test]
    async fn test_initialization_is_idempotent() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let db_path = temp.path().to_str().unwrap().to_string();
        drop(temp); // Remove the file so creation is exercised.

        let url = format!("sqlite://{}", db_path);
        let _pool1 = initialize_database(&url, &CoreSettings::default())
            .await
            .unwrap();
        let _pool2 = initialize_database(&url, &CoreSettings::default())
            .await
            .unwrap();

        let _ = std::fs::remove_file(&db_path);
    }
}

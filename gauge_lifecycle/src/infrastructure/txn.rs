// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transaction Coordinator
//!
//! The single entry point for multi-row writes. Every store method takes an
//! explicit `&mut SqliteConnection` obtained from a transaction opened
//! here; no component discovers a connection from ambient context.
//!
//! ## Semantics
//!
//! - [`TransactionCoordinator::with_txn`] opens a transaction, runs the
//!   closure against it, and commits on success. The whole body is bounded
//!   by the configured query timeout.
//! - On a transient failure (SQLite busy/locked, connection loss) the
//!   entire transaction is retried with exponential backoff, up to the
//!   configured attempt count. Nothing else is ever retried.
//! - Cancellation is dropping the returned future: an uncommitted sqlx
//!   transaction rolls back on drop, and a commit that already happened
//!   stands.

use futures::future::BoxFuture;
use sqlx::sqlite::SqlitePool;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use gauge_lifecycle_domain::GaugeError;

use super::config::CoreSettings;

/// Owns the pool and runs transactional closures with retry.
#[derive(Clone)]
pub struct TransactionCoordinator {
    pool: SqlitePool,
    settings: CoreSettings,
}

impl TransactionCoordinator {
    pub fn new(pool: SqlitePool, settings: CoreSettings) -> Self {
        Self { pool, settings }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    /// Runs `op` inside a transaction, committing on success.
    ///
    /// The closure may run more than once: transient failures retry the
    /// whole transaction, so it must not capture effects outside the
    /// connection.
    pub async fn with_txn<T, F>(&self, op: F) -> Result<T, GaugeError>
    where
        T: Send,
        F: for<'t> Fn(&'t mut SqliteConnection) -> BoxFuture<'t, Result<T, GaugeError>>
            + Send
            + Sync,
    {
        let mut backoff = self.settings.retry_backoff;
        let mut attempt = 1u32;
        loop {
            match self.run_once(&op).await {
                Err(err) if err.is_transient() && attempt < self.settings.retry_attempts => {
                    warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "transient database error, retrying transaction"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn run_once<T, F>(&self, op: &F) -> Result<T, GaugeError>
    where
        T: Send,
        F: for<'t> Fn(&'t mut SqliteConnection) -> BoxFuture<'t, Result<T, GaugeError>>
            + Send
            + Sync,
    {
        let mut tx = self.pool.begin().await.map_err(classify_sqlx_error)?;

        let result = match tokio::time::timeout(self.settings.query_timeout, op(&mut tx)).await {
            Ok(result) => result?,
            Err(_) => {
                // Dropping `tx` below rolls the transaction back.
                return Err(GaugeError::timeout(format!(
                    "transaction exceeded {}s",
                    self.settings.query_timeout.as_secs()
                )));
            }
        };

        tx.commit().await.map_err(classify_sqlx_error)?;
        debug!("transaction committed");
        Ok(result)
    }
}

/// Maps sqlx failures onto the domain taxonomy.
///
/// SQLite reports contention as "database is locked"/"database table is
/// locked" or the BUSY family of result codes; those and dropped
/// connections are the only errors classified transient. Unique-constraint
/// violations become `Conflict` so callers can translate them (the
/// checkout engine turns the active-checkout index into
/// `AlreadyCheckedOut`).
pub fn classify_sqlx_error(err: sqlx::Error) -> GaugeError {
    match &err {
        sqlx::Error::RowNotFound => GaugeError::not_found("row not found"),
        sqlx::Error::PoolTimedOut => GaugeError::timeout("connection acquire timed out"),
        sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed => {
            GaugeError::transient(err.to_string())
        }
        sqlx::Error::Database(db) => {
            let message = db.message().to_lowercase();
            if message.contains("locked") || message.contains("busy") {
                GaugeError::transient(db.message().to_string())
            } else if db.is_unique_violation() || message.contains("unique constraint") {
                GaugeError::conflict(db.message().to_string())
            } else {
                GaugeError::database_error(db.message().to_string())
            }
        }
        _ => GaugeError::database_error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory SQLite is per-connection; keep the pool at one.
    async fn in_memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        let err = classify_sqlx_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, GaugeError::Timeout(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = classify_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, GaugeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_with_txn_commits() {
        let pool = in_memory_pool().await;
        sqlx::query("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT)")
            .execute(&pool)
            .await
            .unwrap();

        let coordinator = TransactionCoordinator::new(pool.clone(), CoreSettings::default());
        coordinator
            .with_txn(|conn| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO items (name) VALUES ('one')")
                        .execute(&mut *conn)
                        .await
                        .map_err(classify_sqlx_error)?;
                    Ok(())
                })
            })
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_with_txn_rolls_back_on_error() {
        let pool = in_memory_pool().await;
        sqlx::query("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT)")
            .execute(&pool)
            .await
            .unwrap();

        let coordinator = TransactionCoordinator::new(pool.clone(), CoreSettings::default());
        let result: Result<(), GaugeError> = coordinator
            .with_txn(|conn| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO items (name) VALUES ('doomed')")
                        .execute(&mut *conn)
                        .await
                        .map_err(classify_sqlx_error)?;
                    Err(GaugeError::precondition_failed("abort"))
                })
            })
            .await;
        assert!(result.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "aborted transaction must leave no rows");
    }

    #[tokio::test]
    async fn test_non_transient_errors_do_not_retry() {
        let pool = in_memory_pool().await;
        let coordinator = TransactionCoordinator::new(pool, CoreSettings::default());

        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<(), GaugeError> = coordinator
            .with_txn(|_conn| {
                attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Box::pin(async move { Err(GaugeError::conflict("no retry")) })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}

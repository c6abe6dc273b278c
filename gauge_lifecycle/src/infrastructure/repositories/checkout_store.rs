// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checkout Store
//!
//! Active-checkout rows. The unique index on `gauge_ref` is the
//! storage-level guarantee of at most one active checkout per gauge; a
//! conflicting insert surfaces as `AlreadyCheckedOut`.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use gauge_lifecycle_domain::entities::ActiveCheckout;
use gauge_lifecycle_domain::GaugeError;

use crate::infrastructure::txn::classify_sqlx_error;

pub struct CheckoutStore;

impl CheckoutStore {
    /// Inserts the active-checkout row for a gauge.
    ///
    /// A unique-index conflict means another holder got there first (or
    /// the same holder already holds it); the caller resolves idempotence
    /// before calling.
    pub async fn insert(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
        user_id: &str,
        checked_out_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<ActiveCheckout, GaugeError> {
        let result = sqlx::query(
            "INSERT INTO active_checkouts (gauge_ref, user_id, checked_out_at, notes) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(gauge_ref)
        .bind(user_id)
        .bind(checked_out_at)
        .bind(notes)
        .execute(&mut *conn)
        .await
        .map_err(|e| match classify_sqlx_error(e) {
            GaugeError::Conflict(_) => {
                GaugeError::AlreadyCheckedOut(format!("Gauge {} is already checked out", gauge_ref))
            }
            other => other,
        })?;

        Ok(ActiveCheckout {
            id: result.last_insert_rowid(),
            gauge_ref,
            user_id: user_id.to_string(),
            checked_out_at,
            notes: notes.map(String::from),
        })
    }

    pub async fn find_by_gauge(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
    ) -> Result<Option<ActiveCheckout>, GaugeError> {
        let row = sqlx::query(
            "SELECT id, gauge_ref, user_id, checked_out_at, notes \
             FROM active_checkouts WHERE gauge_ref = ?",
        )
        .bind(gauge_ref)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(|r| map_row(&r)).transpose()
    }

    /// Deletes the row on return; reports whether one existed.
    pub async fn delete_for(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
    ) -> Result<bool, GaugeError> {
        let result = sqlx::query("DELETE FROM active_checkouts WHERE gauge_ref = ?")
            .bind(gauge_ref)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrites the holder on transfer.
    pub async fn update_holder(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
        new_user_id: &str,
    ) -> Result<(), GaugeError> {
        let result = sqlx::query("UPDATE active_checkouts SET user_id = ? WHERE gauge_ref = ?")
            .bind(new_user_id)
            .bind(gauge_ref)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(GaugeError::not_found(format!(
                "No active checkout for gauge {}",
                gauge_ref
            )));
        }
        Ok(())
    }
}

fn map_row(row: &SqliteRow) -> Result<ActiveCheckout, GaugeError> {
    Ok(ActiveCheckout {
        id: row.try_get("id").map_err(classify_sqlx_error)?,
        gauge_ref: row.try_get("gauge_ref").map_err(classify_sqlx_error)?,
        user_id: row.try_get("user_id").map_err(classify_sqlx_error)?,
        checked_out_at: row.try_get("checked_out_at").map_err(classify_sqlx_error)?,
        notes: row.try_get("notes").map_err(classify_sqlx_error)?,
    })
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Batch Store
//!
//! Calibration batches and their membership rows. The per-gauge-per-batch
//! primary key rejects duplicate membership; "one open batch per gauge" is
//! checked by [`BatchStore::open_batch_for`] before inserts.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use gauge_lifecycle_domain::entities::{BatchMember, BatchStatus, BatchType, CalibrationBatch};
use gauge_lifecycle_domain::GaugeError;

use crate::infrastructure::txn::classify_sqlx_error;

const BATCH_COLUMNS: &str =
    "id, batch_type, vendor, tracking_number, status, sent_at, created_by, created_at";

pub struct BatchStore;

impl BatchStore {
    pub async fn create(
        conn: &mut SqliteConnection,
        batch_type: BatchType,
        vendor: Option<&str>,
        tracking_number: Option<&str>,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> Result<CalibrationBatch, GaugeError> {
        let result = sqlx::query(
            "INSERT INTO calibration_batches (batch_type, vendor, tracking_number, status, \
             created_by, created_at) VALUES (?, ?, ?, 'pending_send', ?, ?)",
        )
        .bind(batch_type.as_str())
        .bind(vendor)
        .bind(tracking_number)
        .bind(created_by)
        .bind(created_at)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        Self::find_by_id(conn, result.last_insert_rowid()).await
    }

    pub async fn find_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<CalibrationBatch, GaugeError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM calibration_batches WHERE id = ?",
            BATCH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(|r| map_batch_row(&r))
            .transpose()?
            .ok_or_else(|| GaugeError::not_found(format!("Calibration batch {}", id)))
    }

    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: i64,
        status: BatchStatus,
    ) -> Result<(), GaugeError> {
        sqlx::query("UPDATE calibration_batches SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(())
    }

    pub async fn mark_sent(
        conn: &mut SqliteConnection,
        id: i64,
        sent_at: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        sqlx::query("UPDATE calibration_batches SET status = 'sent', sent_at = ? WHERE id = ?")
            .bind(sent_at)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(())
    }

    pub async fn add_member(
        conn: &mut SqliteConnection,
        batch_id: i64,
        gauge_ref: i64,
    ) -> Result<(), GaugeError> {
        sqlx::query("INSERT INTO batch_members (batch_id, gauge_ref) VALUES (?, ?)")
            .bind(batch_id)
            .bind(gauge_ref)
            .execute(&mut *conn)
            .await
            .map_err(|e| match classify_sqlx_error(e) {
                GaugeError::Conflict(_) => GaugeError::conflict(format!(
                    "Gauge {} is already in batch {}",
                    gauge_ref, batch_id
                )),
                other => other,
            })?;
        Ok(())
    }

    pub async fn remove_member(
        conn: &mut SqliteConnection,
        batch_id: i64,
        gauge_ref: i64,
    ) -> Result<bool, GaugeError> {
        let result = sqlx::query("DELETE FROM batch_members WHERE batch_id = ? AND gauge_ref = ?")
            .bind(batch_id)
            .bind(gauge_ref)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn members(
        conn: &mut SqliteConnection,
        batch_id: i64,
    ) -> Result<Vec<BatchMember>, GaugeError> {
        let rows = sqlx::query(
            "SELECT batch_id, gauge_ref, received_at, calibration_passed \
             FROM batch_members WHERE batch_id = ? ORDER BY gauge_ref",
        )
        .bind(batch_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        rows.iter().map(map_member_row).collect()
    }

    pub async fn member(
        conn: &mut SqliteConnection,
        batch_id: i64,
        gauge_ref: i64,
    ) -> Result<Option<BatchMember>, GaugeError> {
        let row = sqlx::query(
            "SELECT batch_id, gauge_ref, received_at, calibration_passed \
             FROM batch_members WHERE batch_id = ? AND gauge_ref = ?",
        )
        .bind(batch_id)
        .bind(gauge_ref)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        row.map(|r| map_member_row(&r)).transpose()
    }

    pub async fn mark_received(
        conn: &mut SqliteConnection,
        batch_id: i64,
        gauge_ref: i64,
        received_at: DateTime<Utc>,
        calibration_passed: bool,
    ) -> Result<(), GaugeError> {
        sqlx::query(
            "UPDATE batch_members SET received_at = ?, calibration_passed = ? \
             WHERE batch_id = ? AND gauge_ref = ?",
        )
        .bind(received_at)
        .bind(calibration_passed)
        .bind(batch_id)
        .bind(gauge_ref)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        Ok(())
    }

    /// The open (non-terminal) batch a gauge belongs to, if any.
    pub async fn open_batch_for(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
    ) -> Result<Option<i64>, GaugeError> {
        let id: Option<i64> = sqlx::query_scalar(
            "SELECT b.id FROM calibration_batches b \
             JOIN batch_members m ON m.batch_id = b.id \
             WHERE m.gauge_ref = ? AND b.status IN ('pending_send', 'sent', 'partially_received') \
             LIMIT 1",
        )
        .bind(gauge_ref)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        Ok(id)
    }
}

fn map_batch_row(row: &SqliteRow) -> Result<CalibrationBatch, GaugeError> {
    Ok(CalibrationBatch {
        id: row.try_get("id").map_err(classify_sqlx_error)?,
        batch_type: row
            .try_get::<String, _>("batch_type")
            .map_err(classify_sqlx_error)?
            .parse()?,
        vendor: row.try_get("vendor").map_err(classify_sqlx_error)?,
        tracking_number: row.try_get("tracking_number").map_err(classify_sqlx_error)?,
        status: row
            .try_get::<String, _>("status")
            .map_err(classify_sqlx_error)?
            .parse()?,
        sent_at: row.try_get("sent_at").map_err(classify_sqlx_error)?,
        created_by: row.try_get("created_by").map_err(classify_sqlx_error)?,
        created_at: row.try_get("created_at").map_err(classify_sqlx_error)?,
    })
}

fn map_member_row(row: &SqliteRow) -> Result<BatchMember, GaugeError> {
    let passed: Option<i64> = row
        .try_get("calibration_passed")
        .map_err(classify_sqlx_error)?;
    Ok(BatchMember {
        batch_id: row.try_get("batch_id").map_err(classify_sqlx_error)?,
        gauge_ref: row.try_get("gauge_ref").map_err(classify_sqlx_error)?,
        received_at: row.try_get("received_at").map_err(classify_sqlx_error)?,
        calibration_passed: passed.map(|p| p != 0),
    })
}

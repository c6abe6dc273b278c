// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Certificate Store
//!
//! Rows for the per-gauge certificate chain. Supersession bookkeeping (at
//! most one current, forward links from superseded members) is driven by
//! the registry service inside one transaction; this store only reads and
//! writes rows.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use gauge_lifecycle_domain::entities::Certificate;
use gauge_lifecycle_domain::GaugeError;

use crate::infrastructure::txn::classify_sqlx_error;

const CERT_COLUMNS: &str = "id, gauge_ref, file_ref, uploaded_at, uploaded_by, custom_name, \
     is_current, superseded_at, superseded_by, deleted_at";

pub struct CertificateStore;

impl CertificateStore {
    /// Inserts a new current certificate and returns its id.
    pub async fn insert(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
        file_ref: &str,
        uploaded_by: &str,
        custom_name: Option<&str>,
        uploaded_at: DateTime<Utc>,
    ) -> Result<i64, GaugeError> {
        let result = sqlx::query(
            "INSERT INTO certificates (gauge_ref, file_ref, uploaded_at, uploaded_by, \
             custom_name, is_current) VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(gauge_ref)
        .bind(file_ref)
        .bind(uploaded_at)
        .bind(uploaded_by)
        .bind(custom_name)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Certificate, GaugeError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM certificates WHERE id = ?",
            CERT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(|r| map_row(&r))
            .transpose()?
            .ok_or_else(|| GaugeError::not_found(format!("Certificate {}", id)))
    }

    /// The live current certificates for a gauge (at most one when the
    /// chain invariant holds; the service treats extras as corruption).
    pub async fn current_for(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
    ) -> Result<Vec<Certificate>, GaugeError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM certificates \
             WHERE gauge_ref = ? AND is_current = 1 AND deleted_at IS NULL",
            CERT_COLUMNS
        ))
        .bind(gauge_ref)
        .fetch_all(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        rows.iter().map(map_row).collect()
    }

    pub async fn has_current(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
    ) -> Result<bool, GaugeError> {
        Ok(!Self::current_for(conn, gauge_ref).await?.is_empty())
    }

    /// Marks a certificate superseded by `by_id`.
    pub async fn supersede(
        conn: &mut SqliteConnection,
        id: i64,
        by_id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        sqlx::query(
            "UPDATE certificates SET is_current = 0, superseded_at = ?, superseded_by = ? \
             WHERE id = ?",
        )
        .bind(at)
        .bind(by_id)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        Ok(())
    }

    /// The full non-deleted chain for a gauge in upload order.
    pub async fn list_chain(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
    ) -> Result<Vec<Certificate>, GaugeError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM certificates \
             WHERE gauge_ref = ? AND deleted_at IS NULL ORDER BY uploaded_at, id",
            CERT_COLUMNS
        ))
        .bind(gauge_ref)
        .fetch_all(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        rows.iter().map(map_row).collect()
    }

    pub async fn rename(
        conn: &mut SqliteConnection,
        id: i64,
        custom_name: &str,
    ) -> Result<(), GaugeError> {
        let result = sqlx::query("UPDATE certificates SET custom_name = ? WHERE id = ?")
            .bind(custom_name)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(GaugeError::not_found(format!("Certificate {}", id)));
        }
        Ok(())
    }

    /// Soft delete; the supersession chain stays intact.
    pub async fn soft_delete(
        conn: &mut SqliteConnection,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        let result = sqlx::query(
            "UPDATE certificates SET deleted_at = ?, is_current = 0 WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(at)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(GaugeError::not_found(format!(
                "Certificate {} (or already deleted)",
                id
            )));
        }
        Ok(())
    }
}

fn map_row(row: &SqliteRow) -> Result<Certificate, GaugeError> {
    let cert = Certificate {
        id: row.try_get("id").map_err(classify_sqlx_error)?,
        gauge_ref: row.try_get("gauge_ref").map_err(classify_sqlx_error)?,
        file_ref: row.try_get("file_ref").map_err(classify_sqlx_error)?,
        uploaded_at: row.try_get("uploaded_at").map_err(classify_sqlx_error)?,
        uploaded_by: row.try_get("uploaded_by").map_err(classify_sqlx_error)?,
        custom_name: row.try_get("custom_name").map_err(classify_sqlx_error)?,
        is_current: row.try_get::<i64, _>("is_current").map_err(classify_sqlx_error)? != 0,
        superseded_at: row.try_get("superseded_at").map_err(classify_sqlx_error)?,
        superseded_by: row.try_get("superseded_by").map_err(classify_sqlx_error)?,
        deleted_at: row.try_get("deleted_at").map_err(classify_sqlx_error)?,
    };
    cert.validate()?;
    Ok(cert)
}

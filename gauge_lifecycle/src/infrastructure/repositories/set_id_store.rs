// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Set-ID History Store
//!
//! The ledger of every set id ever assigned. Rows are inserted at set
//! creation and only ever updated to stamp `retired_at`; presence alone
//! burns the id for new sets, so the allocator consults
//! [`SetIdStore::contains`] on every candidate.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection};

use gauge_lifecycle_domain::entities::SetIdRecord;
use gauge_lifecycle_domain::{GaugeError, SetId};

use crate::infrastructure::txn::classify_sqlx_error;

pub struct SetIdStore;

impl SetIdStore {
    /// Whether the id has ever been assigned to a set.
    pub async fn contains(
        conn: &mut SqliteConnection,
        set_id: &SetId,
    ) -> Result<bool, GaugeError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM set_id_history WHERE set_id = ?")
                .bind(set_id.as_str())
                .fetch_one(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
        Ok(count > 0)
    }

    /// Records a freshly-assigned id. The primary key turns a lost
    /// allocation race into `SetIdReused`.
    pub async fn insert(
        conn: &mut SqliteConnection,
        set_id: &SetId,
        first_used_at: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        sqlx::query("INSERT INTO set_id_history (set_id, first_used_at) VALUES (?, ?)")
            .bind(set_id.as_str())
            .bind(first_used_at)
            .execute(&mut *conn)
            .await
            .map_err(|e| match classify_sqlx_error(e) {
                GaugeError::Conflict(_) => GaugeError::SetIdReused(set_id.as_str().to_string()),
                other => other,
            })?;
        Ok(())
    }

    pub async fn retire(
        conn: &mut SqliteConnection,
        set_id: &SetId,
        retired_at: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        let result = sqlx::query("UPDATE set_id_history SET retired_at = ? WHERE set_id = ?")
            .bind(retired_at)
            .bind(set_id.as_str())
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(GaugeError::not_found(format!(
                "Set id {} has no history record",
                set_id
            )));
        }
        Ok(())
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        set_id: &SetId,
    ) -> Result<Option<SetIdRecord>, GaugeError> {
        let row = sqlx::query(
            "SELECT set_id, first_used_at, retired_at FROM set_id_history WHERE set_id = ?",
        )
        .bind(set_id.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(|r| -> Result<SetIdRecord, GaugeError> {
            Ok(SetIdRecord {
                set_id: SetId::new(r.try_get::<String, _>("set_id").map_err(classify_sqlx_error)?)?,
                first_used_at: r.try_get("first_used_at").map_err(classify_sqlx_error)?,
                retired_at: r.try_get("retired_at").map_err(classify_sqlx_error)?,
            })
        })
        .transpose()
    }
}

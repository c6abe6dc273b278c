// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Audit Log
//!
//! Append-only, hash-chained audit trail. Every state-affecting operation
//! appends within its own transaction, so an aborted operation leaves no
//! trace and a committed one always carries its evidence.
//!
//! ## Chain discipline
//!
//! The single `audit_chain_tip` row holds the last committed sequence
//! number and hash. [`AuditLog::append`] updates the tip before inserting
//! the entry: the tip write takes the row lock, serializing concurrent
//! appenders so sequence numbers stay contiguous and each entry links to
//! the true predecessor. Within one transaction, successive appends chain
//! in call order.
//!
//! ## Retention
//!
//! Entries older than the retention window move to `audit_archive`
//! unchanged. Verification follows hashes across both tables, so archival
//! never breaks the chain.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::{debug, warn};

use gauge_lifecycle_domain::entities::audit_entry::{first_invalid_seq, AuditEntry};
use gauge_lifecycle_domain::{AuditSeverity, GaugeError};

use crate::infrastructure::txn::classify_sqlx_error;

const ENTRY_COLUMNS: &str = "seq, timestamp, actor, action, entity_type, entity_id, \
     before_state, after_state, severity, previous_hash, entry_hash";

/// Result of a chain verification pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChainVerification {
    pub valid: bool,
    pub first_invalid_seq: Option<i64>,
}

/// Export/query filter; all fields conjunctive.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub actor: Option<String>,
    pub action: Option<String>,
    pub severity: Option<AuditSeverity>,
    pub from_seq: Option<i64>,
    pub to_seq: Option<i64>,
    pub limit: Option<i64>,
}

pub struct AuditLog;

impl AuditLog {
    /// Appends one entry inside the caller's transaction and returns its
    /// sequence number.
    #[allow(clippy::too_many_arguments)]
    pub async fn append(
        conn: &mut SqliteConnection,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
        severity: AuditSeverity,
    ) -> Result<i64, GaugeError> {
        // Take the tip row's write lock first; concurrent appenders queue
        // here and observe a consistent (last_seq, last_hash).
        sqlx::query("UPDATE audit_chain_tip SET last_seq = last_seq WHERE id = 1")
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;

        let row = sqlx::query("SELECT last_seq, last_hash FROM audit_chain_tip WHERE id = 1")
            .fetch_one(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        let last_seq: i64 = row.try_get("last_seq").map_err(classify_sqlx_error)?;
        let previous_hash: String = row.try_get("last_hash").map_err(classify_sqlx_error)?;

        let seq = last_seq + 1;
        let timestamp = Utc::now();
        let entry_hash = AuditEntry::compute_hash(
            seq,
            timestamp,
            actor,
            action,
            entity_type,
            entity_id,
            before.as_ref(),
            after.as_ref(),
            severity,
            &previous_hash,
        );

        sqlx::query(
            "INSERT INTO audit_log (seq, timestamp, actor, action, entity_type, entity_id, \
             before_state, after_state, severity, previous_hash, entry_hash) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(seq)
        .bind(timestamp)
        .bind(actor)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(before.as_ref().map(|v| v.to_string()))
        .bind(after.as_ref().map(|v| v.to_string()))
        .bind(severity.as_str())
        .bind(&previous_hash)
        .bind(&entry_hash)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        sqlx::query("UPDATE audit_chain_tip SET last_seq = ?, last_hash = ? WHERE id = 1")
            .bind(seq)
            .bind(&entry_hash)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;

        debug!(seq, actor, action, entity_type, entity_id, "audit entry appended");
        Ok(seq)
    }

    /// Recomputes hashes over `[from_seq, to_seq]` and reports the first
    /// mismatch. The range's back-link is anchored on the predecessor
    /// entry (live or archived) or the chain start.
    pub async fn verify_range(
        conn: &mut SqliteConnection,
        from_seq: i64,
        to_seq: i64,
    ) -> Result<ChainVerification, GaugeError> {
        if from_seq < 1 || to_seq < from_seq {
            return Err(GaugeError::validation_error(format!(
                "Invalid verification range {}..{}",
                from_seq, to_seq
            )));
        }

        let expected_previous = if from_seq == 1 {
            String::new()
        } else {
            Self::hash_of(conn, from_seq - 1).await?.ok_or_else(|| {
                GaugeError::not_found(format!("Audit entry {}", from_seq - 1))
            })?
        };

        let entries = Self::fetch_range(conn, from_seq, to_seq).await?;

        // A gap in sequence numbers is itself tampering evidence.
        let mut expected_seq = from_seq;
        for entry in &entries {
            if entry.seq != expected_seq {
                warn!(expected = expected_seq, found = entry.seq, "audit sequence gap");
                return Ok(ChainVerification {
                    valid: false,
                    first_invalid_seq: Some(expected_seq),
                });
            }
            expected_seq += 1;
        }

        match first_invalid_seq(&entries, &expected_previous) {
            Some(seq) => {
                warn!(seq, "audit chain verification failed");
                Ok(ChainVerification {
                    valid: false,
                    first_invalid_seq: Some(seq),
                })
            }
            None => Ok(ChainVerification {
                valid: true,
                first_invalid_seq: None,
            }),
        }
    }

    /// The current tip sequence number (0 when the chain is empty).
    pub async fn tip_seq(conn: &mut SqliteConnection) -> Result<i64, GaugeError> {
        sqlx::query_scalar("SELECT last_seq FROM audit_chain_tip WHERE id = 1")
            .fetch_one(&mut *conn)
            .await
            .map_err(classify_sqlx_error)
    }

    /// Entries for one entity, newest first.
    pub async fn query_by_entity(
        conn: &mut SqliteConnection,
        entity_type: &str,
        entity_id: &str,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, GaugeError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM audit_log WHERE entity_type = ? AND entity_id = ? \
             ORDER BY seq DESC LIMIT ?",
            ENTRY_COLUMNS
        ))
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        rows.iter().map(map_entry_row).collect()
    }

    /// Filtered export in sequence order.
    pub async fn export(
        conn: &mut SqliteConnection,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEntry>, GaugeError> {
        let mut sql = format!("SELECT {} FROM audit_log WHERE 1 = 1", ENTRY_COLUMNS);
        if filter.entity_type.is_some() {
            sql.push_str(" AND entity_type = ?");
        }
        if filter.entity_id.is_some() {
            sql.push_str(" AND entity_id = ?");
        }
        if filter.actor.is_some() {
            sql.push_str(" AND actor = ?");
        }
        if filter.action.is_some() {
            sql.push_str(" AND action = ?");
        }
        if filter.severity.is_some() {
            sql.push_str(" AND severity = ?");
        }
        if filter.from_seq.is_some() {
            sql.push_str(" AND seq >= ?");
        }
        if filter.to_seq.is_some() {
            sql.push_str(" AND seq <= ?");
        }
        sql.push_str(" ORDER BY seq");
        if filter.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(v) = &filter.entity_type {
            query = query.bind(v.clone());
        }
        if let Some(v) = &filter.entity_id {
            query = query.bind(v.clone());
        }
        if let Some(v) = &filter.actor {
            query = query.bind(v.clone());
        }
        if let Some(v) = &filter.action {
            query = query.bind(v.clone());
        }
        if let Some(v) = filter.severity {
            query = query.bind(v.as_str());
        }
        if let Some(v) = filter.from_seq {
            query = query.bind(v);
        }
        if let Some(v) = filter.to_seq {
            query = query.bind(v);
        }
        if let Some(v) = filter.limit {
            query = query.bind(v);
        }

        let rows = query
            .fetch_all(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        rows.iter().map(map_entry_row).collect()
    }

    /// Moves entries older than `cutoff` into the archive table unchanged.
    /// Returns the number of entries moved.
    pub async fn archive_older_than(
        conn: &mut SqliteConnection,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, GaugeError> {
        sqlx::query(
            "INSERT INTO audit_archive (seq, timestamp, actor, action, entity_type, entity_id, \
             before_state, after_state, severity, previous_hash, entry_hash) \
             SELECT seq, timestamp, actor, action, entity_type, entity_id, before_state, \
             after_state, severity, previous_hash, entry_hash \
             FROM audit_log WHERE timestamp < ?",
        )
        .bind(cutoff)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        let result = sqlx::query("DELETE FROM audit_log WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn fetch_range(
        conn: &mut SqliteConnection,
        from_seq: i64,
        to_seq: i64,
    ) -> Result<Vec<AuditEntry>, GaugeError> {
        // Archived and live entries verify as one chain.
        let rows = sqlx::query(&format!(
            "SELECT {cols} FROM audit_log WHERE seq BETWEEN ? AND ? \
             UNION ALL \
             SELECT {cols} FROM audit_archive WHERE seq BETWEEN ? AND ? \
             ORDER BY seq",
            cols = ENTRY_COLUMNS
        ))
        .bind(from_seq)
        .bind(to_seq)
        .bind(from_seq)
        .bind(to_seq)
        .fetch_all(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        rows.iter().map(map_entry_row).collect()
    }

    async fn hash_of(
        conn: &mut SqliteConnection,
        seq: i64,
    ) -> Result<Option<String>, GaugeError> {
        let hash: Option<String> = sqlx::query_scalar(
            "SELECT entry_hash FROM audit_log WHERE seq = ? \
             UNION ALL SELECT entry_hash FROM audit_archive WHERE seq = ?",
        )
        .bind(seq)
        .bind(seq)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        Ok(hash)
    }
}

fn map_entry_row(row: &SqliteRow) -> Result<AuditEntry, GaugeError> {
    let before: Option<String> = row.try_get("before_state").map_err(classify_sqlx_error)?;
    let after: Option<String> = row.try_get("after_state").map_err(classify_sqlx_error)?;

    Ok(AuditEntry {
        seq: row.try_get("seq").map_err(classify_sqlx_error)?,
        timestamp: row.try_get("timestamp").map_err(classify_sqlx_error)?,
        actor: row.try_get("actor").map_err(classify_sqlx_error)?,
        action: row.try_get("action").map_err(classify_sqlx_error)?,
        entity_type: row.try_get("entity_type").map_err(classify_sqlx_error)?,
        entity_id: row.try_get("entity_id").map_err(classify_sqlx_error)?,
        before: before
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| GaugeError::serialization_error(e.to_string()))?,
        after: after
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| GaugeError::serialization_error(e.to_string()))?,
        severity: row
            .try_get::<String, _>("severity")
            .map_err(classify_sqlx_error)?
            .parse()?,
        previous_hash: row.try_get("previous_hash").map_err(classify_sqlx_error)?,
        entry_hash: row.try_get("entry_hash").map_err(classify_sqlx_error)?,
    })
}

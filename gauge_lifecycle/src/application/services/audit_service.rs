// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Audit Service
//!
//! Read surfaces over the audit chain: per-entity queries, range
//! verification, filtered export, and retention archival. All writes to
//! the chain happen inside the owning operations' transactions; this
//! service never appends on its own behalf except for denial evidence.

use chrono::{Duration, Utc};

use gauge_lifecycle_domain::entities::AuditEntry;
use gauge_lifecycle_domain::{Caller, Capability, GaugeError};

use crate::infrastructure::audit::{AuditFilter, AuditLog, ChainVerification};

use super::context::GaugeLifecycleCore;

pub struct AuditService<'a> {
    core: &'a GaugeLifecycleCore,
}

impl<'a> AuditService<'a> {
    pub(crate) fn new(core: &'a GaugeLifecycleCore) -> Self {
        Self { core }
    }

    /// Audit trail for one entity, newest first.
    pub async fn query_by_entity(
        &self,
        caller: &Caller,
        entity_type: &str,
        entity_id: &str,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, GaugeError> {
        self.core
            .authorize(caller, Capability::AuditView, entity_type, entity_id)
            .await?;
        let entity_type = entity_type.to_string();
        let entity_id = entity_id.to_string();
        self.core
            .run_txn(caller.user_id(), &entity_type, &entity_id, |conn| {
                let entity_type = entity_type.clone();
                let entity_id = entity_id.clone();
                Box::pin(async move {
                    AuditLog::query_by_entity(conn, &entity_type, &entity_id, limit).await
                })
            })
            .await
    }

    /// Recomputes the hash chain over an inclusive sequence range.
    pub async fn verify_range(
        &self,
        caller: &Caller,
        from_seq: i64,
        to_seq: i64,
    ) -> Result<ChainVerification, GaugeError> {
        self.core
            .authorize(caller, Capability::AuditView, "audit", "verify")
            .await?;
        self.core
            .run_txn(caller.user_id(), "audit", "verify", |conn| {
                Box::pin(async move { AuditLog::verify_range(conn, from_seq, to_seq).await })
            })
            .await
    }

    /// Verifies the whole chain from the first entry to the tip.
    pub async fn verify_all(&self, caller: &Caller) -> Result<ChainVerification, GaugeError> {
        self.core
            .authorize(caller, Capability::AuditView, "audit", "verify")
            .await?;
        self.core
            .run_txn(caller.user_id(), "audit", "verify", |conn| {
                Box::pin(async move {
                    let tip = AuditLog::tip_seq(conn).await?;
                    if tip == 0 {
                        return Ok(ChainVerification {
                            valid: true,
                            first_invalid_seq: None,
                        });
                    }
                    AuditLog::verify_range(conn, 1, tip).await
                })
            })
            .await
    }

    /// Filtered export in sequence order.
    pub async fn export(
        &self,
        caller: &Caller,
        filter: AuditFilter,
    ) -> Result<Vec<AuditEntry>, GaugeError> {
        self.core
            .authorize(caller, Capability::DataExport, "audit", "export")
            .await?;
        self.core
            .run_txn(caller.user_id(), "audit", "export", |conn| {
                let filter = filter.clone();
                Box::pin(async move { AuditLog::export(conn, &filter).await })
            })
            .await
    }

    /// Moves entries beyond the retention window into the archive table.
    /// Returns how many were moved.
    pub async fn archive_expired(&self, caller: &Caller) -> Result<u64, GaugeError> {
        self.core
            .authorize(caller, Capability::SystemAdmin, "audit", "archive")
            .await?;
        let cutoff = Utc::now() - Duration::days(self.core.settings().audit_retention_days);
        self.core
            .run_txn(caller.user_id(), "audit", "archive", |conn| {
                Box::pin(async move { AuditLog::archive_older_than(conn, cutoff).await })
            })
            .await
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Engine Facade
//!
//! [`GaugeLifecycleCore`] wires the transaction coordinator, event bus, and
//! settings together and hands out the per-domain services. The embedding
//! boundary (HTTP routing, schedulers) holds one core per database and
//! borrows services per request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use gauge_lifecycle_domain::entities::Gauge;
use gauge_lifecycle_domain::services::state_machine;
use gauge_lifecycle_domain::{
    AuditSeverity, AuthorizationGate, Caller, Capability, EventMeta, GaugeError, GaugeEvent,
    GaugeStatus, SystemAlertEvent,
};

use crate::infrastructure::audit::AuditLog;
use crate::infrastructure::config::CoreSettings;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::repositories::{schema, GaugeStore};
use crate::infrastructure::txn::TransactionCoordinator;

use super::{
    AuditService, BatchService, CertificateService, CheckoutService, GaugeService, PairingService,
};

/// The engine's composition root.
pub struct GaugeLifecycleCore {
    txn: TransactionCoordinator,
    bus: Arc<EventBus>,
}

impl GaugeLifecycleCore {
    /// Connects to (creating if missing) and migrates the database, then
    /// builds the core.
    pub async fn connect(database_url: &str, settings: CoreSettings) -> Result<Self, GaugeError> {
        let pool = schema::initialize_database(database_url, &settings)
            .await
            .map_err(|e| GaugeError::database_error(e.to_string()))?;
        info!(database_url, "gauge lifecycle core connected");
        Ok(Self::new(pool, settings))
    }

    /// Builds the core over an already-initialized pool.
    pub fn new(pool: SqlitePool, settings: CoreSettings) -> Self {
        Self {
            txn: TransactionCoordinator::new(pool, settings),
            bus: Arc::new(EventBus::new()),
        }
    }

    pub fn coordinator(&self) -> &TransactionCoordinator {
        &self.txn
    }

    pub fn settings(&self) -> &CoreSettings {
        self.txn.settings()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn gauges(&self) -> GaugeService<'_> {
        GaugeService::new(self)
    }

    pub fn pairing(&self) -> PairingService<'_> {
        PairingService::new(self)
    }

    pub fn checkouts(&self) -> CheckoutService<'_> {
        CheckoutService::new(self)
    }

    pub fn batches(&self) -> BatchService<'_> {
        BatchService::new(self)
    }

    pub fn certificates(&self) -> CertificateService<'_> {
        CertificateService::new(self)
    }

    pub fn audit(&self) -> AuditService<'_> {
        AuditService::new(self)
    }

    /// Authorization with critical-severity evidence on denial.
    pub(crate) async fn authorize(
        &self,
        caller: &Caller,
        capability: Capability,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<(), GaugeError> {
        match AuthorizationGate::authorize(caller, capability) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.record_security_failure(caller.user_id(), entity_type, entity_id, &err)
                    .await;
                Err(err)
            }
        }
    }

    /// Runs one operation transaction, leaving security evidence behind on
    /// failure.
    ///
    /// This is the chokepoint every service operation goes through: when
    /// the transaction surfaces a security-relevant error (an invariant
    /// violation detected anywhere inside it), the critical audit entry
    /// and alert event are recorded even though the operation itself
    /// rolled back.
    pub(crate) async fn run_txn<T, F>(
        &self,
        actor: &str,
        entity_type: &str,
        entity_id: &str,
        op: F,
    ) -> Result<T, GaugeError>
    where
        T: Send,
        F: for<'t> Fn(
                &'t mut SqliteConnection,
            ) -> futures::future::BoxFuture<'t, Result<T, GaugeError>>
            + Send
            + Sync,
    {
        match self.txn.with_txn(op).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.record_security_failure(actor, entity_type, entity_id, &err)
                    .await;
                Err(err)
            }
        }
    }

    /// Writes critical-severity evidence for a security-relevant failure.
    ///
    /// No-op for ordinary errors; the security classification on
    /// `GaugeError` is the single gate. The audit entry runs in its own
    /// small transaction (the failed operation's transaction is already
    /// gone), best-effort, and invariant violations additionally raise the
    /// internal alert event on the bus.
    pub(crate) async fn record_security_failure(
        &self,
        actor: &str,
        entity_type: &str,
        entity_id: &str,
        err: &GaugeError,
    ) {
        if !err.is_security_error() {
            return;
        }

        let (action, payload) = match err {
            GaugeError::PermissionDenied(capability) => (
                "auth.denied",
                json!({ "missing_capability": capability }),
            ),
            _ => (
                "invariant.violation",
                json!({ "kind": err.kind(), "message": err.to_string() }),
            ),
        };

        let actor = actor.to_string();
        let entity_type = entity_type.to_string();
        let entity_id = entity_id.to_string();
        let appended = self
            .txn
            .with_txn(|conn| {
                let actor = actor.clone();
                let entity_type = entity_type.clone();
                let entity_id = entity_id.clone();
                let payload = payload.clone();
                Box::pin(async move {
                    AuditLog::append(
                        conn,
                        &actor,
                        action,
                        &entity_type,
                        &entity_id,
                        None,
                        Some(payload),
                        AuditSeverity::Critical,
                    )
                    .await
                })
            })
            .await;
        if let Err(audit_err) = appended {
            warn!(error = %audit_err, "failed to record security evidence");
        }

        if matches!(err, GaugeError::InvariantViolation(_)) {
            self.bus.publish(&GaugeEvent::SystemAlert(SystemAlertEvent {
                meta: EventMeta::now(),
                entity_type,
                entity_id,
                message: err.to_string(),
            }));
        }
    }
}

/// Validates and writes one status move, with the before/after audit entry.
pub(crate) async fn transition_gauge(
    conn: &mut SqliteConnection,
    gauge: &Gauge,
    to: GaugeStatus,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<(), GaugeError> {
    state_machine::validate(gauge.status(), to)?;
    GaugeStore::set_status(conn, gauge.id(), to, now).await?;
    AuditLog::append(
        conn,
        actor,
        "gauge.status_changed",
        "gauge",
        &gauge.id().to_string(),
        Some(json!({ "status": gauge.status().as_str() })),
        Some(json!({ "status": to.as_str() })),
        AuditSeverity::Info,
    )
    .await?;
    Ok(())
}

/// Loads the cohort for a gauge: itself plus its companion, ascending by
/// internal id so row locks are always taken in the same order.
pub(crate) async fn load_cohort(
    conn: &mut SqliteConnection,
    gauge: Gauge,
) -> Result<Vec<Gauge>, GaugeError> {
    let mut cohort = vec![gauge];
    if let Some(companion_id) = cohort[0].companion_id() {
        let companion = GaugeStore::find_by_id(conn, companion_id).await?;
        Gauge::check_pair_consistency(&cohort[0], &companion)?;
        cohort.push(companion);
    }
    cohort.sort_by_key(|g| g.id());
    Ok(cohort)
}

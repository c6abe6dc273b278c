// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Service
//!
//! Admin-path gauge intake and updates, read surfaces, and the
//! single-gauge lifecycle operations (out-of-service, retirement, QC,
//! customer return). Paired-cohort operations live in the checkout,
//! pairing, and batch services.

use chrono::Utc;
use serde_json::json;

use gauge_lifecycle_domain::entities::{CalibrationSchedule, GaugeDraft, Specification};
use gauge_lifecycle_domain::services::state_machine;
use gauge_lifecycle_domain::{
    AssetCreatedEvent, AssetDeletedEvent, AssetStatusChangedEvent, AssetUpdatedEvent,
    AuditSeverity, Caller, Capability, EquipmentType, EventMeta, GaugeError, GaugeEvent,
    GaugeStatus, SerialNumber,
};

use crate::infrastructure::audit::AuditLog;
use crate::infrastructure::repositories::gauge_store::GaugePatch;
use crate::infrastructure::repositories::{GaugeFilter, GaugeStore, GaugeView, SpareFilter};

use super::context::{transition_gauge, GaugeLifecycleCore};

pub struct GaugeService<'a> {
    core: &'a GaugeLifecycleCore,
}

impl<'a> GaugeService<'a> {
    pub(crate) fn new(core: &'a GaugeLifecycleCore) -> Self {
        Self { core }
    }

    /// Creates a gauge with its specification (admin intake path; thread
    /// gauges enter as spares).
    pub async fn create(
        &self,
        caller: &Caller,
        draft: GaugeDraft,
        spec: Specification,
    ) -> Result<GaugeView, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeManage, "gauge", "new")
            .await?;

        let (view, events) = self
            .core
            .run_txn(caller.user_id(), "gauge", "new", |conn| {
                let draft = draft.clone();
                let spec = spec.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let gauge = GaugeStore::create(conn, &draft, &spec, now).await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "gauge.created",
                        "gauge",
                        &gauge.id().to_string(),
                        None,
                        Some(json!({
                            "equipment_type": gauge.equipment_type().as_str(),
                            "serial_number": gauge.serial_number().map(|s| s.as_str().to_string()),
                        })),
                        AuditSeverity::Info,
                    )
                    .await?;

                    let events = vec![GaugeEvent::AssetCreated(AssetCreatedEvent {
                        meta: EventMeta::now(),
                        gauge_ref: gauge.id(),
                        equipment_type: gauge.equipment_type(),
                    })];
                    let view = GaugeStore::view(conn, gauge).await?;
                    Ok((view, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(view)
    }

    /// Applies a field patch; the display name is derived, so it follows
    /// automatically.
    pub async fn update(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        patch: GaugePatch,
    ) -> Result<GaugeView, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeManage, "gauge", &gauge_ref.to_string())
            .await?;

        let (view, events) = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let patch = patch.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let before = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    let after = GaugeStore::update_fields(conn, gauge_ref, &patch, now).await?;

                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "gauge.updated",
                        "gauge",
                        &gauge_ref.to_string(),
                        Some(serde_json::to_value(&before).map_err(|e| {
                            GaugeError::serialization_error(e.to_string())
                        })?),
                        Some(serde_json::to_value(&after).map_err(|e| {
                            GaugeError::serialization_error(e.to_string())
                        })?),
                        AuditSeverity::Info,
                    )
                    .await?;

                    let events = vec![GaugeEvent::AssetUpdated(AssetUpdatedEvent {
                        meta: EventMeta::now(),
                        gauge_ref,
                        changes: patch.changed_fields(),
                    })];
                    let view = GaugeStore::view(conn, after).await?;
                    Ok((view, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(view)
    }

    pub async fn get(&self, caller: &Caller, gauge_ref: i64) -> Result<GaugeView, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "gauge", &gauge_ref.to_string())
            .await?;
        self.core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                Box::pin(async move {
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    GaugeStore::view(conn, gauge).await
                })
            })
            .await
    }

    pub async fn get_by_serial(
        &self,
        caller: &Caller,
        equipment_type: EquipmentType,
        serial: &str,
    ) -> Result<GaugeView, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "gauge", serial)
            .await?;
        let serial = SerialNumber::new(serial)?;
        self.core
            .run_txn(caller.user_id(), "gauge", serial.as_str(), |conn| {
                let serial = serial.clone();
                Box::pin(async move {
                    let gauge = GaugeStore::find_by_serial(conn, equipment_type, &serial).await?;
                    GaugeStore::view(conn, gauge).await
                })
            })
            .await
    }

    /// Gauges matching the public identifier: one for plain equipment, the
    /// A and B members for a thread set.
    pub async fn get_by_public_id(
        &self,
        caller: &Caller,
        public_id: &str,
    ) -> Result<Vec<GaugeView>, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "gauge", public_id)
            .await?;
        let public_id = public_id.to_string();
        self.core
            .run_txn(caller.user_id(), "gauge", &public_id, |conn| {
                let public_id = public_id.clone();
                Box::pin(async move {
                    let gauges = GaugeStore::find_by_public_id(conn, &public_id).await?;
                    let mut views = Vec::with_capacity(gauges.len());
                    for gauge in gauges {
                        views.push(GaugeStore::view(conn, gauge).await?);
                    }
                    Ok(views)
                })
            })
            .await
    }

    pub async fn list(
        &self,
        caller: &Caller,
        filter: GaugeFilter,
    ) -> Result<Vec<GaugeView>, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "gauge", "list")
            .await?;
        self.core
            .run_txn(caller.user_id(), "gauge", "list", |conn| {
                let filter = filter.clone();
                Box::pin(async move {
                    let gauges = GaugeStore::list(conn, &filter).await?;
                    let mut views = Vec::with_capacity(gauges.len());
                    for gauge in gauges {
                        views.push(GaugeStore::view(conn, gauge).await?);
                    }
                    Ok(views)
                })
            })
            .await
    }

    /// Unpaired, available thread gauges matching the thread filter.
    pub async fn list_spares(
        &self,
        caller: &Caller,
        filter: SpareFilter,
    ) -> Result<Vec<GaugeView>, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "gauge", "spares")
            .await?;
        self.core
            .run_txn(caller.user_id(), "gauge", "spares", |conn| {
                let filter = filter.clone();
                Box::pin(async move {
                    let gauges = GaugeStore::find_spare_thread_gauges(conn, &filter).await?;
                    let mut views = Vec::with_capacity(gauges.len());
                    for gauge in gauges {
                        views.push(GaugeStore::view(conn, gauge).await?);
                    }
                    Ok(views)
                })
            })
            .await
    }

    pub async fn mark_out_of_service(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        reason: Option<String>,
    ) -> Result<(), GaugeError> {
        self.single_transition(
            caller,
            gauge_ref,
            GaugeStatus::OutOfService,
            Capability::GaugeManage,
            reason,
        )
        .await
    }

    /// Returns a sidelined gauge to service.
    pub async fn return_to_service(
        &self,
        caller: &Caller,
        gauge_ref: i64,
    ) -> Result<(), GaugeError> {
        self.single_transition(
            caller,
            gauge_ref,
            GaugeStatus::Available,
            Capability::GaugeManage,
            None,
        )
        .await
    }

    /// Retires a single gauge. Terminal; the entity and its history remain.
    pub async fn retire(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        reason: Option<String>,
    ) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeManage, "gauge", &gauge_ref.to_string())
            .await?;

        let events = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let reason = reason.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    let from = gauge.status();
                    transition_gauge(conn, &gauge, GaugeStatus::Retired, caller.user_id(), now)
                        .await?;
                    if let Some(reason) = &reason {
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.retired",
                            "gauge",
                            &gauge_ref.to_string(),
                            None,
                            Some(json!({ "reason": reason })),
                            AuditSeverity::Info,
                        )
                        .await?;
                    }
                    Ok(vec![
                        GaugeEvent::AssetStatusChanged(AssetStatusChangedEvent {
                            meta: EventMeta::now(),
                            gauge_ref,
                            from,
                            to: GaugeStatus::Retired,
                        }),
                        GaugeEvent::AssetDeleted(AssetDeletedEvent {
                            meta: EventMeta::now(),
                            gauge_ref,
                            reason,
                        }),
                    ])
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(())
    }

    /// Routes an available gauge into explicit quality control.
    pub async fn request_qc(&self, caller: &Caller, gauge_ref: i64) -> Result<(), GaugeError> {
        self.single_transition(
            caller,
            gauge_ref,
            GaugeStatus::PendingQc,
            Capability::GaugeOperate,
            None,
        )
        .await
    }

    /// Passes QC, releasing the gauge back to availability.
    pub async fn qc_pass(&self, caller: &Caller, gauge_ref: i64) -> Result<(), GaugeError> {
        self.single_transition(
            caller,
            gauge_ref,
            GaugeStatus::Available,
            Capability::GaugeOperate,
            None,
        )
        .await
    }

    /// Hands customer property back to its owner. Terminal-for-rental:
    /// the gauge leaves circulation but keeps its audit trail.
    pub async fn mark_returned(&self, caller: &Caller, gauge_ref: i64) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeManage, "gauge", &gauge_ref.to_string())
            .await?;

        let events = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    state_machine::validate_customer_return(&gauge)?;
                    let from = gauge.status();
                    GaugeStore::set_status(conn, gauge_ref, GaugeStatus::Returned, now).await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "gauge.status_changed",
                        "gauge",
                        &gauge_ref.to_string(),
                        Some(json!({ "status": from.as_str() })),
                        Some(json!({ "status": GaugeStatus::Returned.as_str() })),
                        AuditSeverity::Info,
                    )
                    .await?;
                    Ok(vec![GaugeEvent::AssetStatusChanged(
                        AssetStatusChangedEvent {
                            meta: EventMeta::now(),
                            gauge_ref,
                            from,
                            to: GaugeStatus::Returned,
                        },
                    )])
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(())
    }

    /// Schedules due on or before `cutoff`, for external reminder services.
    pub async fn due_for_calibration(
        &self,
        caller: &Caller,
        cutoff: chrono::DateTime<Utc>,
    ) -> Result<Vec<CalibrationSchedule>, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "gauge", "due")
            .await?;
        self.core
            .run_txn(caller.user_id(), "gauge", "due", |conn| {
                Box::pin(async move { GaugeStore::due_for_calibration(conn, cutoff).await })
            })
            .await
    }

    async fn single_transition(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        to: GaugeStatus,
        capability: Capability,
        reason: Option<String>,
    ) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, capability, "gauge", &gauge_ref.to_string())
            .await?;

        let events = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let reason = reason.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    let from = gauge.status();
                    transition_gauge(conn, &gauge, to, caller.user_id(), now).await?;
                    if let Some(reason) = &reason {
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.status_reason",
                            "gauge",
                            &gauge_ref.to_string(),
                            None,
                            Some(json!({ "reason": reason, "status": to.as_str() })),
                            AuditSeverity::Info,
                        )
                        .await?;
                    }
                    Ok(vec![GaugeEvent::AssetStatusChanged(
                        AssetStatusChangedEvent {
                            meta: EventMeta::now(),
                            gauge_ref,
                            from,
                            to,
                        },
                    )])
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(())
    }
}

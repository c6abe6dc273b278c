// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Calibration Batch Service
//!
//! The batch workflow: create → add gauges → send → receive per gauge →
//! verify certificates → release. Sending moves every member to
//! `out_for_calibration` in one transaction; receipt is per gauge (pass
//! seals and parks in `pending_certificate`, fail retires); verification
//! and release move paired members together.
//!
//! Set members are added to and removed from a batch as a pair, so a
//! cohort is never split across vendors.

use chrono::Utc;
use serde_json::json;

use gauge_lifecycle_domain::entities::{BatchMember, BatchStatus, BatchType, CalibrationBatch};
use gauge_lifecycle_domain::services::state_machine;
use gauge_lifecycle_domain::{
    AssetDeletedEvent, AssetStatusChangedEvent, AuditSeverity, BatchCompletedEvent,
    BatchCreatedEvent, BatchReceivedEvent, BatchSentEvent, Caller, Capability, EventMeta,
    GaugeError, GaugeEvent, GaugeStatus,
};

use crate::infrastructure::audit::AuditLog;
use crate::infrastructure::repositories::{BatchStore, CertificateStore, GaugeStore};

use super::context::{load_cohort, transition_gauge, GaugeLifecycleCore};

pub struct BatchService<'a> {
    core: &'a GaugeLifecycleCore,
}

impl<'a> BatchService<'a> {
    pub(crate) fn new(core: &'a GaugeLifecycleCore) -> Self {
        Self { core }
    }

    /// Step 1: creates a batch. External batches must name their vendor.
    pub async fn create(
        &self,
        caller: &Caller,
        batch_type: BatchType,
        vendor: Option<String>,
        tracking_number: Option<String>,
    ) -> Result<CalibrationBatch, GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "batch", "new")
            .await?;
        CalibrationBatch::validate_new(batch_type, vendor.as_deref())?;

        let (batch, events) = self
            .core
            .run_txn(caller.user_id(), "batch", "new", |conn| {
                let vendor = vendor.clone();
                let tracking_number = tracking_number.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let batch = BatchStore::create(
                        conn,
                        batch_type,
                        vendor.as_deref(),
                        tracking_number.as_deref(),
                        caller.user_id(),
                        now,
                    )
                    .await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "batch.created",
                        "batch",
                        &batch.id.to_string(),
                        None,
                        Some(json!({
                            "batch_type": batch_type.as_str(),
                            "vendor": vendor,
                        })),
                        AuditSeverity::Info,
                    )
                    .await?;
                    let events = vec![GaugeEvent::BatchCreated(BatchCreatedEvent {
                        meta: EventMeta::now(),
                        batch_id: batch.id,
                        batch_type,
                    })];
                    Ok((batch, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(batch)
    }

    /// Step 2: adds a gauge (and its companion) to an unsent batch.
    pub async fn add_gauge(
        &self,
        caller: &Caller,
        batch_id: i64,
        gauge_ref: i64,
    ) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "batch", &batch_id.to_string())
            .await?;

        self.core
            .run_txn(caller.user_id(), "batch", &batch_id.to_string(), |conn| {
                let caller = caller.clone();
                Box::pin(async move {
                    let batch = BatchStore::find_by_id(conn, batch_id).await?;
                    if !batch.accepts_membership_changes() {
                        return Err(GaugeError::precondition_failed(format!(
                            "Batch {} is {} and no longer accepts gauges",
                            batch_id, batch.status
                        )));
                    }

                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    let cohort = load_cohort(conn, gauge).await?;
                    for member in &cohort {
                        if member.status() == GaugeStatus::CheckedOut {
                            return Err(GaugeError::precondition_failed(format!(
                                "Gauge {} is checked out",
                                member.id()
                            )));
                        }
                        if let Some(open) = BatchStore::open_batch_for(conn, member.id()).await? {
                            return Err(GaugeError::precondition_failed(format!(
                                "Gauge {} is already in batch {}",
                                member.id(),
                                open
                            )));
                        }
                    }
                    for member in &cohort {
                        BatchStore::add_member(conn, batch_id, member.id()).await?;
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "batch.gauge_added",
                            "batch",
                            &batch_id.to_string(),
                            None,
                            Some(json!({ "gauge_ref": member.id() })),
                            AuditSeverity::Info,
                        )
                        .await?;
                    }
                    Ok(())
                })
            })
            .await
    }

    /// Removes a gauge (and its companion) from an unsent batch.
    pub async fn remove_gauge(
        &self,
        caller: &Caller,
        batch_id: i64,
        gauge_ref: i64,
    ) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "batch", &batch_id.to_string())
            .await?;

        self.core
            .run_txn(caller.user_id(), "batch", &batch_id.to_string(), |conn| {
                let caller = caller.clone();
                Box::pin(async move {
                    let batch = BatchStore::find_by_id(conn, batch_id).await?;
                    if !batch.accepts_membership_changes() {
                        return Err(GaugeError::precondition_failed(format!(
                            "Batch {} is {} and no longer accepts changes",
                            batch_id, batch.status
                        )));
                    }
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    let cohort = load_cohort(conn, gauge).await?;
                    for member in &cohort {
                        if BatchStore::remove_member(conn, batch_id, member.id()).await? {
                            AuditLog::append(
                                conn,
                                caller.user_id(),
                                "batch.gauge_removed",
                                "batch",
                                &batch_id.to_string(),
                                Some(json!({ "gauge_ref": member.id() })),
                                None,
                                AuditSeverity::Info,
                            )
                            .await?;
                        }
                    }
                    Ok(())
                })
            })
            .await
    }

    /// Step 3: sends a non-empty batch; every member moves to
    /// `out_for_calibration` atomically.
    pub async fn send(&self, caller: &Caller, batch_id: i64) -> Result<CalibrationBatch, GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "batch", &batch_id.to_string())
            .await?;

        let (batch, events) = self
            .core
            .run_txn(caller.user_id(), "batch", &batch_id.to_string(), |conn| {
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let batch = BatchStore::find_by_id(conn, batch_id).await?;
                    if batch.status != BatchStatus::PendingSend {
                        return Err(GaugeError::precondition_failed(format!(
                            "Batch {} is {}, only pending_send batches can be sent",
                            batch_id, batch.status
                        )));
                    }
                    let members = BatchStore::members(conn, batch_id).await?;
                    if members.is_empty() {
                        return Err(GaugeError::precondition_failed(format!(
                            "Batch {} has no gauges",
                            batch_id
                        )));
                    }

                    let mut events = Vec::with_capacity(members.len() + 1);
                    for member in &members {
                        let gauge = GaugeStore::find_by_id(conn, member.gauge_ref).await?;
                        let from = gauge.status();
                        transition_gauge(
                            conn,
                            &gauge,
                            GaugeStatus::OutForCalibration,
                            caller.user_id(),
                            now,
                        )
                        .await?;
                        events.push(GaugeEvent::AssetStatusChanged(AssetStatusChangedEvent {
                            meta: EventMeta::now(),
                            gauge_ref: gauge.id(),
                            from,
                            to: GaugeStatus::OutForCalibration,
                        }));
                    }

                    BatchStore::mark_sent(conn, batch_id, now).await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "batch.sent",
                        "batch",
                        &batch_id.to_string(),
                        Some(json!({ "status": batch.status.as_str() })),
                        Some(json!({ "status": "sent", "members": members.len() })),
                        AuditSeverity::Info,
                    )
                    .await?;
                    events.push(GaugeEvent::BatchSent(BatchSentEvent {
                        meta: EventMeta::now(),
                        batch_id,
                        member_count: members.len(),
                    }));

                    let batch = BatchStore::find_by_id(conn, batch_id).await?;
                    Ok((batch, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(batch)
    }

    /// Step 4: records one gauge coming back from the vendor. Passing
    /// gauges seal and await their certificate; failing gauges retire.
    /// The batch completes when the last member is received.
    pub async fn receive_gauge(
        &self,
        caller: &Caller,
        batch_id: i64,
        gauge_ref: i64,
        calibration_passed: bool,
    ) -> Result<CalibrationBatch, GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "batch", &batch_id.to_string())
            .await?;

        let (batch, events) = self
            .core
            .run_txn(caller.user_id(), "batch", &batch_id.to_string(), |conn| {
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let batch = BatchStore::find_by_id(conn, batch_id).await?;
                    if !matches!(
                        batch.status,
                        BatchStatus::Sent | BatchStatus::PartiallyReceived
                    ) {
                        return Err(GaugeError::precondition_failed(format!(
                            "Batch {} is {}, gauges can only be received after sending",
                            batch_id, batch.status
                        )));
                    }

                    let member = BatchStore::member(conn, batch_id, gauge_ref)
                        .await?
                        .ok_or_else(|| {
                            GaugeError::not_found(format!(
                                "Gauge {} is not in batch {}",
                                gauge_ref, batch_id
                            ))
                        })?;
                    if member.is_received() {
                        return Err(GaugeError::precondition_failed(format!(
                            "Gauge {} was already received",
                            gauge_ref
                        )));
                    }

                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    state_machine::require_status(
                        &gauge,
                        &[GaugeStatus::OutForCalibration],
                        "receive requires an out-for-calibration gauge",
                    )?;

                    let mut events = Vec::new();
                    if calibration_passed {
                        transition_gauge(
                            conn,
                            &gauge,
                            GaugeStatus::PendingCertificate,
                            caller.user_id(),
                            now,
                        )
                        .await?;
                        GaugeStore::set_sealed(conn, gauge_ref, true, now).await?;
                        events.push(GaugeEvent::AssetStatusChanged(AssetStatusChangedEvent {
                            meta: EventMeta::now(),
                            gauge_ref,
                            from: GaugeStatus::OutForCalibration,
                            to: GaugeStatus::PendingCertificate,
                        }));
                    } else {
                        transition_gauge(conn, &gauge, GaugeStatus::Retired, caller.user_id(), now)
                            .await?;
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.retired",
                            "gauge",
                            &gauge_ref.to_string(),
                            None,
                            Some(json!({ "reason": "calibration_failed" })),
                            AuditSeverity::Warning,
                        )
                        .await?;
                        events.push(GaugeEvent::AssetDeleted(AssetDeletedEvent {
                            meta: EventMeta::now(),
                            gauge_ref,
                            reason: Some("calibration_failed".to_string()),
                        }));
                    }

                    BatchStore::mark_received(conn, batch_id, gauge_ref, now, calibration_passed)
                        .await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "batch.gauge_received",
                        "batch",
                        &batch_id.to_string(),
                        None,
                        Some(json!({
                            "gauge_ref": gauge_ref,
                            "calibration_passed": calibration_passed,
                        })),
                        AuditSeverity::Info,
                    )
                    .await?;
                    events.push(GaugeEvent::BatchReceived(BatchReceivedEvent {
                        meta: EventMeta::now(),
                        batch_id,
                        gauge_ref,
                        calibration_passed,
                    }));

                    let members = BatchStore::members(conn, batch_id).await?;
                    let all_received = members.iter().all(BatchMember::is_received);
                    let new_status = if all_received {
                        BatchStatus::Completed
                    } else {
                        BatchStatus::PartiallyReceived
                    };
                    BatchStore::set_status(conn, batch_id, new_status).await?;
                    if all_received {
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "batch.completed",
                            "batch",
                            &batch_id.to_string(),
                            None,
                            None,
                            AuditSeverity::Info,
                        )
                        .await?;
                        events.push(GaugeEvent::BatchCompleted(BatchCompletedEvent {
                            meta: EventMeta::now(),
                            batch_id,
                        }));
                    }

                    let batch = BatchStore::find_by_id(conn, batch_id).await?;
                    Ok((batch, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(batch)
    }

    /// Step 6: verifies certificates for a gauge in `pending_certificate`.
    ///
    /// Unpaired gauges need one current certificate. Paired gauges move
    /// only when both members are certified and parked; until then the
    /// call reports `AwaitingCompanionCertificate` and changes nothing.
    pub async fn verify_certificates(
        &self,
        caller: &Caller,
        gauge_ref: i64,
    ) -> Result<Vec<i64>, GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "gauge", &gauge_ref.to_string())
            .await?;

        let (released, events) = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    state_machine::require_status(
                        &gauge,
                        &[GaugeStatus::PendingCertificate],
                        "certificate verification requires pending_certificate",
                    )?;
                    if !CertificateStore::has_current(conn, gauge_ref).await? {
                        return Err(GaugeError::precondition_failed(format!(
                            "Gauge {} has no current certificate",
                            gauge_ref
                        )));
                    }

                    let cohort = load_cohort(conn, gauge).await?;
                    if cohort.len() == 2 {
                        let companion = cohort
                            .iter()
                            .find(|g| g.id() != gauge_ref)
                            .ok_or_else(|| GaugeError::internal_error("cohort without companion"))?;
                        if companion.status() != GaugeStatus::PendingCertificate
                            || !CertificateStore::has_current(conn, companion.id()).await?
                        {
                            return Err(GaugeError::AwaitingCompanionCertificate(format!(
                                "Companion gauge {} is not yet certified",
                                companion.id()
                            )));
                        }
                    }

                    let mut moved = Vec::with_capacity(cohort.len());
                    let mut events = Vec::with_capacity(cohort.len());
                    for member in &cohort {
                        transition_gauge(
                            conn,
                            member,
                            GaugeStatus::PendingRelease,
                            caller.user_id(),
                            now,
                        )
                        .await?;
                        moved.push(member.id());
                        events.push(GaugeEvent::AssetStatusChanged(AssetStatusChangedEvent {
                            meta: EventMeta::now(),
                            gauge_ref: member.id(),
                            from: GaugeStatus::PendingCertificate,
                            to: GaugeStatus::PendingRelease,
                        }));
                    }
                    Ok((moved, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(released)
    }

    /// Step 7: location-verify and release back to availability. A fresh
    /// storage location applies to the named gauge, and to its companion
    /// only when `apply_location_to_companion` is set; every released
    /// gauge must end up with a non-null location.
    pub async fn release_gauge(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        storage_location: Option<String>,
        apply_location_to_companion: bool,
    ) -> Result<Vec<i64>, GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "gauge", &gauge_ref.to_string())
            .await?;

        let (released, events) = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let storage_location = storage_location.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    state_machine::require_status(
                        &gauge,
                        &[GaugeStatus::PendingRelease],
                        "release requires pending_release",
                    )?;
                    let cohort = load_cohort(conn, gauge).await?;

                    let mut released = Vec::with_capacity(cohort.len());
                    let mut events = Vec::with_capacity(cohort.len());
                    for member in &cohort {
                        let takes_new_location = member.id() == gauge_ref
                            || apply_location_to_companion;
                        let location = if takes_new_location {
                            storage_location
                                .clone()
                                .or_else(|| member.storage_location().map(String::from))
                        } else {
                            member.storage_location().map(String::from)
                        };
                        let location = location.ok_or_else(|| {
                            GaugeError::precondition_failed(format!(
                                "Gauge {} has no storage location to release to",
                                member.id()
                            ))
                        })?;

                        GaugeStore::set_storage_location(conn, member.id(), &location, now)
                            .await?;
                        transition_gauge(
                            conn,
                            member,
                            GaugeStatus::Available,
                            caller.user_id(),
                            now,
                        )
                        .await?;
                        released.push(member.id());
                        events.push(GaugeEvent::AssetStatusChanged(AssetStatusChangedEvent {
                            meta: EventMeta::now(),
                            gauge_ref: member.id(),
                            from: GaugeStatus::PendingRelease,
                            to: GaugeStatus::Available,
                        }));
                    }
                    Ok((released, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(released)
    }

    /// Cancels an unsent batch. Members are left untouched.
    pub async fn cancel(&self, caller: &Caller, batch_id: i64) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "batch", &batch_id.to_string())
            .await?;

        self.core
            .run_txn(caller.user_id(), "batch", &batch_id.to_string(), |conn| {
                let caller = caller.clone();
                Box::pin(async move {
                    let batch = BatchStore::find_by_id(conn, batch_id).await?;
                    if !batch.can_cancel() {
                        return Err(GaugeError::precondition_failed(format!(
                            "Batch {} is {} and cannot be cancelled",
                            batch_id, batch.status
                        )));
                    }
                    BatchStore::set_status(conn, batch_id, BatchStatus::Cancelled).await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "batch.cancelled",
                        "batch",
                        &batch_id.to_string(),
                        Some(json!({ "status": batch.status.as_str() })),
                        Some(json!({ "status": "cancelled" })),
                        AuditSeverity::Info,
                    )
                    .await?;
                    Ok(())
                })
            })
            .await
    }

    /// A batch with its membership rows.
    pub async fn get(
        &self,
        caller: &Caller,
        batch_id: i64,
    ) -> Result<(CalibrationBatch, Vec<BatchMember>), GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "batch", &batch_id.to_string())
            .await?;
        self.core
            .run_txn(caller.user_id(), "batch", &batch_id.to_string(), |conn| {
                Box::pin(async move {
                    let batch = BatchStore::find_by_id(conn, batch_id).await?;
                    let members = BatchStore::members(conn, batch_id).await?;
                    Ok((batch, members))
                })
            })
            .await
    }
}

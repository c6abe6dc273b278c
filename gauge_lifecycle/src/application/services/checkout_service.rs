// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checkout Service
//!
//! Active checkouts, returns, and transfers. Paired thread gauges move as
//! a cohort: checking out the GO member checks out the NO-GO under the
//! same holder with the same timestamp, and a partial failure aborts the
//! whole transaction.
//!
//! Re-checkout by the current holder with identical notes is a no-op that
//! returns the existing rows; anyone else hits `AlreadyCheckedOut`.

use chrono::Utc;
use serde_json::json;

use gauge_lifecycle_domain::entities::ActiveCheckout;
use gauge_lifecycle_domain::{
    AssetCheckedOutEvent, AssetReturnedEvent, AssetTransferredEvent, AuditSeverity, Caller,
    Capability, EventMeta, GaugeError, GaugeEvent, GaugeStatus,
};

use crate::infrastructure::audit::AuditLog;
use crate::infrastructure::repositories::{CheckoutStore, GaugeStore};

use super::context::{load_cohort, transition_gauge, GaugeLifecycleCore};

pub struct CheckoutService<'a> {
    core: &'a GaugeLifecycleCore,
}

impl<'a> CheckoutService<'a> {
    pub(crate) fn new(core: &'a GaugeLifecycleCore) -> Self {
        Self { core }
    }

    /// Checks out a gauge (and its companion) to the caller.
    pub async fn checkout(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        notes: Option<String>,
    ) -> Result<Vec<ActiveCheckout>, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeOperate, "gauge", &gauge_ref.to_string())
            .await?;

        let (checkouts, events) = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let notes = notes.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    let cohort = load_cohort(conn, gauge).await?;

                    // Idempotent re-checkout by the same holder.
                    if cohort.iter().all(|g| g.status() == GaugeStatus::CheckedOut) {
                        let mut existing = Vec::with_capacity(cohort.len());
                        for member in &cohort {
                            match CheckoutStore::find_by_gauge(conn, member.id()).await? {
                                Some(ac)
                                    if ac.is_same_request(
                                        caller.user_id(),
                                        notes.as_deref(),
                                    ) =>
                                {
                                    existing.push(ac)
                                }
                                _ => {
                                    return Err(GaugeError::AlreadyCheckedOut(format!(
                                        "Gauge {} is already checked out",
                                        member.id()
                                    )))
                                }
                            }
                        }
                        return Ok((existing, Vec::new()));
                    }

                    let now = Utc::now();
                    let mut checkouts = Vec::with_capacity(cohort.len());
                    let mut events = Vec::with_capacity(cohort.len());
                    for member in &cohort {
                        if let Some(reason) = member.blocks_checkout_for(caller.user_id()) {
                            return Err(GaugeError::precondition_failed(reason));
                        }
                        transition_gauge(
                            conn,
                            member,
                            GaugeStatus::CheckedOut,
                            caller.user_id(),
                            now,
                        )
                        .await?;
                        let checkout = CheckoutStore::insert(
                            conn,
                            member.id(),
                            caller.user_id(),
                            now,
                            notes.as_deref(),
                        )
                        .await?;
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.checked_out",
                            "gauge",
                            &member.id().to_string(),
                            None,
                            Some(json!({ "user": caller.user_id(), "notes": &notes })),
                            AuditSeverity::Info,
                        )
                        .await?;
                        events.push(GaugeEvent::AssetCheckedOut(AssetCheckedOutEvent {
                            meta: EventMeta::now(),
                            gauge_ref: member.id(),
                            user_id: caller.user_id().to_string(),
                        }));
                        checkouts.push(checkout);
                    }
                    Ok((checkouts, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(checkouts)
    }

    /// Returns a gauge (and its companion). The target status is
    /// `pending_qc` when the equipment type is under post-use inspection
    /// policy, `available` otherwise.
    pub async fn return_gauge(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        notes: Option<String>,
    ) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeOperate, "gauge", &gauge_ref.to_string())
            .await?;

        let qc_on_return = self.core.settings().qc_on_return.clone();
        let events = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let notes = notes.clone();
                let qc_on_return = qc_on_return.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    let cohort = load_cohort(conn, gauge).await?;

                    let mut events = Vec::with_capacity(cohort.len());
                    for member in &cohort {
                        let checkout = CheckoutStore::find_by_gauge(conn, member.id())
                            .await?
                            .ok_or_else(|| {
                                GaugeError::precondition_failed(format!(
                                    "Gauge {} is not checked out",
                                    member.id()
                                ))
                            })?;

                        let target = if qc_on_return.contains(&member.equipment_type()) {
                            GaugeStatus::PendingQc
                        } else {
                            GaugeStatus::Available
                        };
                        CheckoutStore::delete_for(conn, member.id()).await?;
                        transition_gauge(conn, member, target, caller.user_id(), now).await?;
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.returned",
                            "gauge",
                            &member.id().to_string(),
                            Some(json!({ "holder": &checkout.user_id })),
                            Some(json!({ "notes": &notes, "status": target.as_str() })),
                            AuditSeverity::Info,
                        )
                        .await?;
                        events.push(GaugeEvent::AssetReturned(AssetReturnedEvent {
                            meta: EventMeta::now(),
                            gauge_ref: member.id(),
                            user_id: checkout.user_id,
                            to_status: target,
                        }));
                    }
                    Ok(events)
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(())
    }

    /// Moves the active checkout (whole cohort) to a new holder without a
    /// return/checkout cycle. Recorded as its own audit action.
    pub async fn transfer(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        new_holder: &str,
    ) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeOperate, "gauge", &gauge_ref.to_string())
            .await?;

        let new_holder = new_holder.to_string();
        let events = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let new_holder = new_holder.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                    let cohort = load_cohort(conn, gauge).await?;

                    let mut events = Vec::with_capacity(cohort.len());
                    for member in &cohort {
                        let checkout = CheckoutStore::find_by_gauge(conn, member.id())
                            .await?
                            .ok_or_else(|| {
                                GaugeError::precondition_failed(format!(
                                    "Gauge {} is not checked out",
                                    member.id()
                                ))
                            })?;
                        CheckoutStore::update_holder(conn, member.id(), &new_holder).await?;
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.transferred",
                            "gauge",
                            &member.id().to_string(),
                            Some(json!({ "holder": &checkout.user_id })),
                            Some(json!({ "holder": &new_holder })),
                            AuditSeverity::Info,
                        )
                        .await?;
                        events.push(GaugeEvent::AssetTransferred(AssetTransferredEvent {
                            meta: EventMeta::now(),
                            gauge_ref: member.id(),
                            from_user: checkout.user_id,
                            to_user: new_holder.clone(),
                        }));
                    }
                    Ok(events)
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(())
    }

    /// The active checkout for a gauge, if any.
    pub async fn active_checkout(
        &self,
        caller: &Caller,
        gauge_ref: i64,
    ) -> Result<Option<ActiveCheckout>, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "gauge", &gauge_ref.to_string())
            .await?;
        self.core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                Box::pin(async move { CheckoutStore::find_by_gauge(conn, gauge_ref).await })
            })
            .await
    }
}

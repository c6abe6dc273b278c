// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pairing Service
//!
//! Every operation that changes which thread gauges form a GO/NO-GO set:
//! creating a set from two spares, replacing one member, unpairing, and
//! retiring a whole set, plus the Set-ID History rules that make
//! historical audit unambiguous.
//!
//! ## Set-id allocation
//!
//! The allocator starts one past the highest id ever recorded in Set-ID
//! History and advances over any candidate present there, so an id that
//! has ever named a set can never name a different one. A caller-specified
//! id that was ever used is rejected with `SetIdReused`.
//!
//! ## Write order
//!
//! All member updates inside a transaction touch rows in ascending
//! internal-id order; combined with the history row's primary key this
//! keeps concurrent pairing operations deadlock-free and makes a lost
//! allocation race surface as `SetIdReused` instead of corruption.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::SqliteConnection;
use tracing::info;

use gauge_lifecycle_domain::entities::{AuditEntry, Gauge, SetIdRecord, ThreadSpecification};
use gauge_lifecycle_domain::services::state_machine;
use gauge_lifecycle_domain::{
    AuditSeverity, Caller, Capability, EquipmentType, EventMeta, GaugeError, GaugeEvent,
    GaugeStatus, GaugeSuffix, SerialNumber, SetCreatedEvent, SetId, SetMemberReplacedEvent,
    SetRetiredEvent, SetUnpairedEvent,
};

use crate::infrastructure::audit::AuditLog;
use crate::infrastructure::repositories::gauge_store::GaugePatch;
use crate::infrastructure::repositories::{GaugeStore, GaugeView, SetIdStore};

use super::context::{transition_gauge, GaugeLifecycleCore};

/// Fields written identically to both members at set creation.
#[derive(Debug, Clone, Default)]
pub struct SharedSetFields {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    /// Explicit set id; must never have been used before.
    pub requested_set_id: Option<String>,
}

/// A set's history: the ledger row plus its audit trail.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SetHistory {
    pub record: Option<SetIdRecord>,
    pub entries: Vec<AuditEntry>,
}

pub struct PairingService<'a> {
    core: &'a GaugeLifecycleCore,
}

impl<'a> PairingService<'a> {
    pub(crate) fn new(core: &'a GaugeLifecycleCore) -> Self {
        Self { core }
    }

    /// Pairs two spares into a new set. The first serial becomes the GO
    /// member (suffix A), the second the NO-GO (suffix B).
    pub async fn pair_spares(
        &self,
        caller: &Caller,
        go_serial: &str,
        nogo_serial: &str,
        shared: SharedSetFields,
    ) -> Result<(SetId, Vec<GaugeView>), GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeManage, "set", "new")
            .await?;

        let go_serial = SerialNumber::new(go_serial)?;
        let nogo_serial = SerialNumber::new(nogo_serial)?;
        let prefix = self.core.settings().set_id_prefix.clone();
        let width = self.core.settings().set_id_width;

        let (set_id, views, events) = self
            .core
            .run_txn(caller.user_id(), "set", "new", |conn| {
                let go_serial = go_serial.clone();
                let nogo_serial = nogo_serial.clone();
                let shared = shared.clone();
                let prefix = prefix.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let go =
                        GaugeStore::find_by_serial(conn, EquipmentType::ThreadGauge, &go_serial)
                            .await?;
                    let nogo =
                        GaugeStore::find_by_serial(conn, EquipmentType::ThreadGauge, &nogo_serial)
                            .await?;

                    if go.id() == nogo.id() {
                        return Err(GaugeError::validation_error(
                            "A set needs two distinct gauges",
                        ));
                    }
                    require_spare(&go)?;
                    require_spare(&nogo)?;

                    let go_spec = require_thread_spec(conn, &go).await?;
                    let nogo_spec = require_thread_spec(conn, &nogo).await?;
                    if !go_spec.matches(&nogo_spec) {
                        return Err(GaugeError::precondition_failed(format!(
                            "Thread specifications differ: {} vs {}",
                            go_spec.thread_size, nogo_spec.thread_size
                        )));
                    }

                    let set_id =
                        allocate_set_id(conn, &prefix, width, shared.requested_set_id.as_deref())
                            .await?;

                    // Ascending-id write order; suffix follows call order,
                    // not row order.
                    let mut members = [
                        (go.clone(), GaugeSuffix::A, nogo.id()),
                        (nogo.clone(), GaugeSuffix::B, go.id()),
                    ];
                    members.sort_by_key(|(g, _, _)| g.id());
                    for (gauge, suffix, companion) in &members {
                        GaugeStore::set_pairing(
                            conn,
                            gauge.id(),
                            Some(set_id.as_str()),
                            Some(*suffix),
                            Some(*companion),
                            now,
                        )
                        .await?;
                        apply_shared_fields(conn, gauge.id(), &shared, now).await?;
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.updated",
                            "gauge",
                            &gauge.id().to_string(),
                            Some(json!({ "gauge_id": null, "suffix": null, "companion": null })),
                            Some(json!({
                                "gauge_id": set_id.as_str(),
                                "suffix": suffix.as_str(),
                                "companion": companion,
                            })),
                            AuditSeverity::Info,
                        )
                        .await?;
                    }

                    SetIdStore::insert(conn, &set_id, now).await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "set.created",
                        "set",
                        set_id.as_str(),
                        None,
                        Some(json!({ "go_ref": go.id(), "nogo_ref": nogo.id() })),
                        AuditSeverity::Info,
                    )
                    .await?;

                    let events = vec![GaugeEvent::SetCreated(SetCreatedEvent {
                        meta: EventMeta::now(),
                        set_id: set_id.as_str().to_string(),
                        go_ref: go.id(),
                        nogo_ref: nogo.id(),
                    })];

                    let mut views = Vec::with_capacity(2);
                    for gauge_ref in [go.id(), nogo.id()] {
                        let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                        views.push(GaugeStore::view(conn, gauge).await?);
                    }
                    Ok((set_id, views, events))
                })
            })
            .await?;

        info!(set_id = %set_id, "thread gauge set created");
        self.core.event_bus().publish_all(&events);
        Ok((set_id, views))
    }

    /// Replaces one member of a set with a spare of matching thread
    /// specification. The public set id is preserved; audit history keeps
    /// referring to the old member by internal id.
    pub async fn replace_member(
        &self,
        caller: &Caller,
        set_id: &str,
        old_serial: &str,
        new_spare_serial: &str,
    ) -> Result<Vec<GaugeView>, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeManage, "set", set_id)
            .await?;

        let set_id = SetId::new(set_id)?;
        let old_serial = SerialNumber::new(old_serial)?;
        let new_serial = SerialNumber::new(new_spare_serial)?;

        let (views, events) = self
            .core
            .run_txn(caller.user_id(), "set", set_id.as_str(), |conn| {
                let set_id = set_id.clone();
                let old_serial = old_serial.clone();
                let new_serial = new_serial.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let members = load_set_members(conn, &set_id).await?;
                    let (old_member, partner) = split_members(&members, &old_serial)?;

                    if members.iter().any(|g| g.status() == GaugeStatus::CheckedOut) {
                        return Err(GaugeError::precondition_failed(
                            "Cannot replace a member while the set is checked out",
                        ));
                    }

                    let incoming =
                        GaugeStore::find_by_serial(conn, EquipmentType::ThreadGauge, &new_serial)
                            .await?;
                    require_spare(&incoming)?;

                    let old_spec = require_thread_spec(conn, old_member).await?;
                    let incoming_spec = require_thread_spec(conn, &incoming).await?;
                    if !incoming_spec.matches(&old_spec) {
                        return Err(GaugeError::precondition_failed(format!(
                            "Replacement spare {} does not match thread specification {}",
                            incoming.serial_number().map(|s| s.to_string()).unwrap_or_default(),
                            old_spec.thread_size
                        )));
                    }

                    let suffix = old_member.suffix().ok_or_else(|| {
                        GaugeError::invariant_violation("Set member carries no suffix")
                    })?;

                    // Three row updates, ascending internal id.
                    let mut writes: Vec<(i64, PairingWrite)> = vec![
                        (old_member.id(), PairingWrite::Clear),
                        (
                            incoming.id(),
                            PairingWrite::Assign {
                                suffix,
                                companion: partner.id(),
                            },
                        ),
                        (
                            partner.id(),
                            PairingWrite::Repoint {
                                companion: incoming.id(),
                            },
                        ),
                    ];
                    writes.sort_by_key(|(id, _)| *id);
                    for (gauge_ref, write) in &writes {
                        match write {
                            PairingWrite::Clear => {
                                GaugeStore::set_pairing(conn, *gauge_ref, None, None, None, now)
                                    .await?;
                                GaugeStore::set_status(
                                    conn,
                                    *gauge_ref,
                                    GaugeStatus::Available,
                                    now,
                                )
                                .await?;
                            }
                            PairingWrite::Assign { suffix, companion } => {
                                GaugeStore::set_pairing(
                                    conn,
                                    *gauge_ref,
                                    Some(set_id.as_str()),
                                    Some(*suffix),
                                    Some(*companion),
                                    now,
                                )
                                .await?;
                            }
                            PairingWrite::Repoint { companion } => {
                                let partner_row = GaugeStore::find_by_id(conn, *gauge_ref).await?;
                                GaugeStore::set_pairing(
                                    conn,
                                    *gauge_ref,
                                    partner_row.gauge_id(),
                                    partner_row.suffix(),
                                    Some(*companion),
                                    now,
                                )
                                .await?;
                            }
                        }
                    }

                    for (gauge_ref, action) in [
                        (old_member.id(), "removed_from_set"),
                        (incoming.id(), "assigned_to_set"),
                    ] {
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.updated",
                            "gauge",
                            &gauge_ref.to_string(),
                            None,
                            Some(json!({ "change": action, "set_id": set_id.as_str() })),
                            AuditSeverity::Info,
                        )
                        .await?;
                    }
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "set.member_replaced",
                        "set",
                        set_id.as_str(),
                        Some(json!({ "member": old_member.id() })),
                        Some(json!({ "member": incoming.id() })),
                        AuditSeverity::Info,
                    )
                    .await?;

                    let events = vec![GaugeEvent::SetMemberReplaced(SetMemberReplacedEvent {
                        meta: EventMeta::now(),
                        set_id: set_id.as_str().to_string(),
                        removed_ref: old_member.id(),
                        added_ref: incoming.id(),
                    })];

                    let mut views = Vec::with_capacity(3);
                    for gauge_ref in [old_member.id(), incoming.id(), partner.id()] {
                        let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;
                        views.push(GaugeStore::view(conn, gauge).await?);
                    }
                    Ok((views, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(views)
    }

    /// Dissolves a set: both members become spares again. The set id stays
    /// burned in history, so it can never name a different pair.
    pub async fn unpair(&self, caller: &Caller, set_id: &str) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeManage, "set", set_id)
            .await?;

        let set_id = SetId::new(set_id)?;
        let events = self
            .core
            .run_txn(caller.user_id(), "set", set_id.as_str(), |conn| {
                let set_id = set_id.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let mut members = load_set_members(conn, &set_id).await?;
                    members.sort_by_key(|g| g.id());

                    for member in &members {
                        state_machine::require_status(
                            member,
                            &[GaugeStatus::Available],
                            "unpair requires both members in storage",
                        )?;
                    }
                    for member in &members {
                        GaugeStore::set_pairing(conn, member.id(), None, None, None, now).await?;
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "gauge.updated",
                            "gauge",
                            &member.id().to_string(),
                            Some(json!({ "gauge_id": set_id.as_str() })),
                            Some(json!({ "gauge_id": null })),
                            AuditSeverity::Info,
                        )
                        .await?;
                    }
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "set.unpaired",
                        "set",
                        set_id.as_str(),
                        Some(json!({
                            "members": members.iter().map(|g| g.id()).collect::<Vec<_>>()
                        })),
                        None,
                        AuditSeverity::Info,
                    )
                    .await?;

                    Ok(vec![GaugeEvent::SetUnpaired(SetUnpairedEvent {
                        meta: EventMeta::now(),
                        set_id: set_id.as_str().to_string(),
                        member_refs: [members[0].id(), members[1].id()],
                    })])
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(())
    }

    /// Retires a whole set. Members stay paired for historical clarity and
    /// the history row is stamped retired.
    pub async fn retire_set(&self, caller: &Caller, set_id: &str) -> Result<(), GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeManage, "set", set_id)
            .await?;

        let set_id = SetId::new(set_id)?;
        let events = self
            .core
            .run_txn(caller.user_id(), "set", set_id.as_str(), |conn| {
                let set_id = set_id.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let mut members = load_set_members(conn, &set_id).await?;
                    members.sort_by_key(|g| g.id());

                    for member in &members {
                        transition_gauge(conn, member, GaugeStatus::Retired, caller.user_id(), now)
                            .await?;
                    }
                    SetIdStore::retire(conn, &set_id, now).await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "set.retired",
                        "set",
                        set_id.as_str(),
                        None,
                        Some(json!({
                            "members": members.iter().map(|g| g.id()).collect::<Vec<_>>()
                        })),
                        AuditSeverity::Info,
                    )
                    .await?;

                    Ok(vec![GaugeEvent::SetRetired(SetRetiredEvent {
                        meta: EventMeta::now(),
                        set_id: set_id.as_str().to_string(),
                    })])
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(())
    }

    /// The ledger row and audit trail for a set id.
    pub async fn set_history(
        &self,
        caller: &Caller,
        set_id: &str,
    ) -> Result<SetHistory, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "set", set_id)
            .await?;

        let set_id = SetId::new(set_id)?;
        self.core
            .run_txn(caller.user_id(), "set", set_id.as_str(), |conn| {
                let set_id = set_id.clone();
                Box::pin(async move {
                    let record = SetIdStore::find(conn, &set_id).await?;
                    let entries =
                        AuditLog::query_by_entity(conn, "set", set_id.as_str(), 200).await?;
                    Ok(SetHistory { record, entries })
                })
            })
            .await
    }
}

enum PairingWrite {
    Clear,
    Assign { suffix: GaugeSuffix, companion: i64 },
    Repoint { companion: i64 },
}

fn require_spare(gauge: &Gauge) -> Result<(), GaugeError> {
    if !gauge.is_spare() {
        return Err(GaugeError::precondition_failed(format!(
            "Gauge {} is not a spare",
            gauge.id()
        )));
    }
    if gauge.status() != GaugeStatus::Available {
        return Err(GaugeError::precondition_failed(format!(
            "Spare {} is not available (status {})",
            gauge.id(),
            gauge.status()
        )));
    }
    Ok(())
}

async fn require_thread_spec(
    conn: &mut SqliteConnection,
    gauge: &Gauge,
) -> Result<ThreadSpecification, GaugeError> {
    GaugeStore::specification(conn, gauge)
        .await?
        .and_then(|s| s.as_thread().cloned())
        .ok_or_else(|| {
            GaugeError::invariant_violation(format!(
                "Thread gauge {} has no thread specification",
                gauge.id()
            ))
        })
}

/// Resolves the set id for a new set: the caller's explicit choice (which
/// must never have been used) or the next allocator candidate not present
/// in history.
async fn allocate_set_id(
    conn: &mut SqliteConnection,
    prefix: &str,
    width: usize,
    requested: Option<&str>,
) -> Result<SetId, GaugeError> {
    if let Some(requested) = requested {
        let set_id = SetId::new(requested)?;
        if SetIdStore::contains(conn, &set_id).await? {
            return Err(GaugeError::SetIdReused(set_id.as_str().to_string()));
        }
        return Ok(set_id);
    }

    // The allocator proposes one past the highest id currently worn by a
    // gauge; history then advances it over every id ever used, so a
    // dissolved set's id is proposed but never granted.
    let start = GaugeStore::highest_set_counter(conn, prefix)
        .await?
        .map_or(1, |n| n + 1);
    let mut candidate = SetId::format(prefix, start, width)?;
    while SetIdStore::contains(conn, &candidate).await? {
        candidate = candidate.successor()?;
    }
    Ok(candidate)
}

async fn apply_shared_fields(
    conn: &mut SqliteConnection,
    gauge_ref: i64,
    shared: &SharedSetFields,
    now: DateTime<Utc>,
) -> Result<(), GaugeError> {
    let patch = GaugePatch {
        manufacturer: shared.manufacturer.clone(),
        model: shared.model.clone(),
        category: shared.category.clone(),
        ..GaugePatch::default()
    };
    if !patch.changed_fields().is_empty() {
        GaugeStore::update_fields(conn, gauge_ref, &patch, now).await?;
    }
    Ok(())
}

async fn load_set_members(
    conn: &mut SqliteConnection,
    set_id: &SetId,
) -> Result<Vec<Gauge>, GaugeError> {
    let members = GaugeStore::find_by_public_id(conn, set_id.as_str()).await?;
    if members.len() != 2 {
        return Err(GaugeError::not_found(format!(
            "Set {} has {} members on record",
            set_id,
            members.len()
        )));
    }
    Gauge::check_pair_consistency(&members[0], &members[1])?;
    Ok(members)
}

fn split_members<'g>(
    members: &'g [Gauge],
    old_serial: &SerialNumber,
) -> Result<(&'g Gauge, &'g Gauge), GaugeError> {
    let old = members
        .iter()
        .find(|g| g.serial_number() == Some(old_serial))
        .ok_or_else(|| {
            GaugeError::not_found(format!("No set member with serial {}", old_serial))
        })?;
    let partner = members
        .iter()
        .find(|g| g.id() != old.id())
        .ok_or_else(|| GaugeError::invariant_violation("Set has a single member"))?;
    Ok((old, partner))
}

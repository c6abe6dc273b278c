// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Domain Events
//!
//! The canonical event set crossing the in-process bus. Payloads are
//! structured records, not free-form strings; subscribers (notification
//! senders, reminder schedulers) react to committed state only: the engine
//! publishes after the owning transaction commits, best-effort and
//! unordered with respect to external consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::calibration_batch::BatchType;
use crate::value_objects::{EquipmentType, GaugeStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GaugeEvent {
    AssetCreated(AssetCreatedEvent),
    AssetUpdated(AssetUpdatedEvent),
    AssetDeleted(AssetDeletedEvent),
    AssetCheckedOut(AssetCheckedOutEvent),
    AssetReturned(AssetReturnedEvent),
    AssetTransferred(AssetTransferredEvent),
    AssetCalibrationChanged(AssetCalibrationChangedEvent),
    AssetStatusChanged(AssetStatusChangedEvent),
    SetCreated(SetCreatedEvent),
    SetMemberReplaced(SetMemberReplacedEvent),
    SetUnpaired(SetUnpairedEvent),
    SetRetired(SetRetiredEvent),
    BatchCreated(BatchCreatedEvent),
    BatchSent(BatchSentEvent),
    BatchReceived(BatchReceivedEvent),
    BatchCompleted(BatchCompletedEvent),
    CertificateUploaded(CertificateUploadedEvent),
    CertificateSuperseded(CertificateSupersededEvent),
    SystemAlert(SystemAlertEvent),
}

impl GaugeEvent {
    /// Canonical dotted event name.
    pub fn name(&self) -> &'static str {
        match self {
            GaugeEvent::AssetCreated(_) => "asset.created",
            GaugeEvent::AssetUpdated(_) => "asset.updated",
            GaugeEvent::AssetDeleted(_) => "asset.deleted",
            GaugeEvent::AssetCheckedOut(_) => "asset.checked_out",
            GaugeEvent::AssetReturned(_) => "asset.returned",
            GaugeEvent::AssetTransferred(_) => "asset.transferred",
            GaugeEvent::AssetCalibrationChanged(_) => "asset.calibration_changed",
            GaugeEvent::AssetStatusChanged(_) => "asset.status_changed",
            GaugeEvent::SetCreated(_) => "set.created",
            GaugeEvent::SetMemberReplaced(_) => "set.member_replaced",
            GaugeEvent::SetUnpaired(_) => "set.unpaired",
            GaugeEvent::SetRetired(_) => "set.retired",
            GaugeEvent::BatchCreated(_) => "batch.created",
            GaugeEvent::BatchSent(_) => "batch.sent",
            GaugeEvent::BatchReceived(_) => "batch.received",
            GaugeEvent::BatchCompleted(_) => "batch.completed",
            GaugeEvent::CertificateUploaded(_) => "certificate.uploaded",
            GaugeEvent::CertificateSuperseded(_) => "certificate.superseded",
            GaugeEvent::SystemAlert(_) => "system.invariant_violation",
        }
    }
}

/// Shared identity fields stamped on every event at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMeta {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl EventMeta {
    pub fn now() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }
}

impl Default for EventMeta {
    fn default() -> Self {
        Self::now()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCreatedEvent {
    pub meta: EventMeta,
    pub gauge_ref: i64,
    pub equipment_type: EquipmentType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUpdatedEvent {
    pub meta: EventMeta,
    pub gauge_ref: i64,
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDeletedEvent {
    pub meta: EventMeta,
    pub gauge_ref: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCheckedOutEvent {
    pub meta: EventMeta,
    pub gauge_ref: i64,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetReturnedEvent {
    pub meta: EventMeta,
    pub gauge_ref: i64,
    pub user_id: String,
    pub to_status: GaugeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetTransferredEvent {
    pub meta: EventMeta,
    pub gauge_ref: i64,
    pub from_user: String,
    pub to_user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCalibrationChangedEvent {
    pub meta: EventMeta,
    pub gauge_ref: i64,
    pub next_due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetStatusChangedEvent {
    pub meta: EventMeta,
    pub gauge_ref: i64,
    pub from: GaugeStatus,
    pub to: GaugeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCreatedEvent {
    pub meta: EventMeta,
    pub set_id: String,
    pub go_ref: i64,
    pub nogo_ref: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMemberReplacedEvent {
    pub meta: EventMeta,
    pub set_id: String,
    pub removed_ref: i64,
    pub added_ref: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetUnpairedEvent {
    pub meta: EventMeta,
    pub set_id: String,
    pub member_refs: [i64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRetiredEvent {
    pub meta: EventMeta,
    pub set_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCreatedEvent {
    pub meta: EventMeta,
    pub batch_id: i64,
    pub batch_type: BatchType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSentEvent {
    pub meta: EventMeta,
    pub batch_id: i64,
    pub member_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReceivedEvent {
    pub meta: EventMeta,
    pub batch_id: i64,
    pub gauge_ref: i64,
    pub calibration_passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCompletedEvent {
    pub meta: EventMeta,
    pub batch_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateUploadedEvent {
    pub meta: EventMeta,
    pub certificate_id: i64,
    pub gauge_ref: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateSupersededEvent {
    pub meta: EventMeta,
    pub superseded_id: i64,
    pub superseded_by: i64,
    pub gauge_ref: i64,
}

/// Raised alongside critical audit entries when an invariant violation is
/// detected at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemAlertEvent {
    pub meta: EventMeta,
    pub entity_type: String,
    pub entity_id: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = GaugeEvent::SetCreated(SetCreatedEvent {
            meta: EventMeta::now(),
            set_id: "SP0222".to_string(),
            go_ref: 1,
            nogo_ref: 2,
        });
        assert_eq!(event.name(), "set.created");

        let alert = GaugeEvent::SystemAlert(SystemAlertEvent {
            meta: EventMeta::now(),
            entity_type: "gauge".to_string(),
            entity_id: "1".to_string(),
            message: "companion pointer mismatch".to_string(),
        });
        assert_eq!(alert.name(), "system.invariant_violation");
    }

    #[test]
    fn test_events_serialize() {
        let event = GaugeEvent::AssetStatusChanged(AssetStatusChangedEvent {
            meta: EventMeta::now(),
            gauge_ref: 42,
            from: GaugeStatus::Available,
            to: GaugeStatus::CheckedOut,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("checked_out"));
    }
}

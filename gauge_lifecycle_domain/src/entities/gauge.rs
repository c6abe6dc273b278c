// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Entity
//!
//! The central entity of the engine: one tracked measurement instrument.
//!
//! ## Identity
//!
//! - **Internal id** (`i64`): stable, database-allocated, never reused.
//!   All companion pointers and audit references use it.
//! - **Public id** (`gauge_id`): the shared set id for paired thread
//!   gauges, an admin-assigned label for other equipment, and absent for
//!   spare thread gauges (which are identified by serial number alone).
//!
//! ## Invariants
//!
//! Enforced here where a single entity suffices, and by
//! [`Gauge::check_pair_consistency`] where both members are needed:
//!
//! - Thread gauges always carry a serial number
//! - Suffix and companion pointer come and go together with the public id
//! - Companion pointers are bidirectional, share the public id, and carry
//!   opposite suffixes
//!
//! A gauge is never hard-deleted; retirement is a terminal status and the
//! specification, certificates, and audit history outlive every lifecycle
//! change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{
    EquipmentType, GaugeStatus, GaugeSuffix, OwnershipType, SerialNumber, SetId,
};
use crate::GaugeError;

/// Creation input for a new gauge. Validated before any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeDraft {
    pub gauge_id: Option<String>,
    pub serial_number: Option<SerialNumber>,
    pub equipment_type: EquipmentType,
    pub category: Option<String>,
    pub ownership: OwnershipType,
    pub owner_user_id: Option<String>,
    pub storage_location: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub calibration_frequency_days: i64,
    pub custom_name: Option<String>,
}

impl GaugeDraft {
    /// Validates creation-time rules that do not need database state.
    pub fn validate(&self) -> Result<(), GaugeError> {
        if self.equipment_type.requires_serial() && self.serial_number.is_none() {
            return Err(GaugeError::validation_error(
                "Thread gauges require a serial number",
            ));
        }
        if self.equipment_type == EquipmentType::ThreadGauge && self.gauge_id.is_some() {
            return Err(GaugeError::validation_error(
                "Thread gauges enter as spares; set ids are assigned by pairing",
            ));
        }
        if self.ownership == OwnershipType::Employee && self.owner_user_id.is_none() {
            return Err(GaugeError::validation_error(
                "Employee-owned gauges require an owning user",
            ));
        }
        if self.calibration_frequency_days <= 0 {
            return Err(GaugeError::validation_error(
                "Calibration frequency must be positive",
            ));
        }
        Ok(())
    }
}

/// Fully-hydrated gauge state, as read back from storage.
///
/// Public-field mirror of [`Gauge`] used at the persistence boundary; the
/// store builds one per row and promotes it via [`Gauge::from_data`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeData {
    pub id: i64,
    pub gauge_id: Option<String>,
    pub serial_number: Option<SerialNumber>,
    pub equipment_type: EquipmentType,
    pub category: Option<String>,
    pub ownership: OwnershipType,
    pub owner_user_id: Option<String>,
    pub status: GaugeStatus,
    pub is_sealed: bool,
    pub unseal_pending: bool,
    pub storage_location: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub calibration_frequency_days: i64,
    pub suffix: Option<GaugeSuffix>,
    pub companion_id: Option<i64>,
    pub custom_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tracked measurement instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gauge {
    id: i64,
    gauge_id: Option<String>,
    serial_number: Option<SerialNumber>,
    equipment_type: EquipmentType,
    category: Option<String>,
    ownership: OwnershipType,
    owner_user_id: Option<String>,
    status: GaugeStatus,
    is_sealed: bool,
    unseal_pending: bool,
    storage_location: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    calibration_frequency_days: i64,
    suffix: Option<GaugeSuffix>,
    companion_id: Option<i64>,
    custom_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Gauge {
    /// Promotes stored state into the entity, checking single-row invariants.
    pub fn from_data(data: GaugeData) -> Result<Self, GaugeError> {
        let gauge = Self {
            id: data.id,
            gauge_id: data.gauge_id,
            serial_number: data.serial_number,
            equipment_type: data.equipment_type,
            category: data.category,
            ownership: data.ownership,
            owner_user_id: data.owner_user_id,
            status: data.status,
            is_sealed: data.is_sealed,
            unseal_pending: data.unseal_pending,
            storage_location: data.storage_location,
            manufacturer: data.manufacturer,
            model: data.model,
            calibration_frequency_days: data.calibration_frequency_days,
            suffix: data.suffix,
            companion_id: data.companion_id,
            custom_name: data.custom_name,
            created_at: data.created_at,
            updated_at: data.updated_at,
        };
        gauge.validate()?;
        Ok(gauge)
    }

    /// Single-row invariants. Violations indicate data corruption and are
    /// surfaced as `InvariantViolation`.
    pub fn validate(&self) -> Result<(), GaugeError> {
        if self.equipment_type.requires_serial() && self.serial_number.is_none() {
            return Err(GaugeError::invariant_violation(format!(
                "Thread gauge {} has no serial number",
                self.id
            )));
        }
        if self.equipment_type == EquipmentType::ThreadGauge {
            // Set assignment fields travel together.
            let assigned = [
                self.gauge_id.is_some(),
                self.suffix.is_some(),
                self.companion_id.is_some(),
            ];
            if assigned.iter().any(|b| *b) && !assigned.iter().all(|b| *b) {
                return Err(GaugeError::invariant_violation(format!(
                    "Thread gauge {} has a partial set assignment",
                    self.id
                )));
            }
        } else if self.suffix.is_some() || self.companion_id.is_some() {
            return Err(GaugeError::invariant_violation(format!(
                "Non-thread gauge {} carries pairing fields",
                self.id
            )));
        }
        Ok(())
    }

    /// Cross-row invariant for a companion pair: bidirectional pointers,
    /// shared public id, opposite suffixes.
    pub fn check_pair_consistency(a: &Gauge, b: &Gauge) -> Result<(), GaugeError> {
        if a.companion_id != Some(b.id) || b.companion_id != Some(a.id) {
            return Err(GaugeError::invariant_violation(format!(
                "Companion pointers between {} and {} are not bidirectional",
                a.id, b.id
            )));
        }
        if a.gauge_id.is_none() || a.gauge_id != b.gauge_id {
            return Err(GaugeError::invariant_violation(format!(
                "Companions {} and {} do not share a set id",
                a.id, b.id
            )));
        }
        match (a.suffix, b.suffix) {
            (Some(sa), Some(sb)) if sa == sb.opposite() => Ok(()),
            _ => Err(GaugeError::invariant_violation(format!(
                "Companions {} and {} do not carry opposite suffixes",
                a.id, b.id
            ))),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn gauge_id(&self) -> Option<&str> {
        self.gauge_id.as_deref()
    }

    pub fn serial_number(&self) -> Option<&SerialNumber> {
        self.serial_number.as_ref()
    }

    pub fn equipment_type(&self) -> EquipmentType {
        self.equipment_type
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn ownership(&self) -> OwnershipType {
        self.ownership
    }

    pub fn owner_user_id(&self) -> Option<&str> {
        self.owner_user_id.as_deref()
    }

    pub fn status(&self) -> GaugeStatus {
        self.status
    }

    pub fn is_sealed(&self) -> bool {
        self.is_sealed
    }

    pub fn unseal_pending(&self) -> bool {
        self.unseal_pending
    }

    pub fn storage_location(&self) -> Option<&str> {
        self.storage_location.as_deref()
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn calibration_frequency_days(&self) -> i64 {
        self.calibration_frequency_days
    }

    pub fn suffix(&self) -> Option<GaugeSuffix> {
        self.suffix
    }

    pub fn companion_id(&self) -> Option<i64> {
        self.companion_id
    }

    pub fn custom_name(&self) -> Option<&str> {
        self.custom_name.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// A spare: an unpaired thread gauge, identified by serial only.
    pub fn is_spare(&self) -> bool {
        self.equipment_type == EquipmentType::ThreadGauge && self.gauge_id.is_none()
    }

    pub fn is_paired(&self) -> bool {
        self.companion_id.is_some()
    }

    /// Full public label: the shared set id plus this member's suffix for
    /// paired thread gauges, the plain public id otherwise.
    pub fn public_label(&self) -> Option<String> {
        match (&self.gauge_id, self.suffix) {
            (Some(set_id), Some(suffix)) => Some(format!("{}{}", set_id, suffix.as_char())),
            (Some(id), None) => Some(id.clone()),
            _ => None,
        }
    }

    /// The set id as a typed value, for paired thread gauges.
    pub fn set_id(&self) -> Option<SetId> {
        match (self.equipment_type, &self.gauge_id) {
            (EquipmentType::ThreadGauge, Some(id)) => SetId::new(id).ok(),
            _ => None,
        }
    }

    /// Checkout eligibility that depends only on this row. Cohort and
    /// status rules live in the state machine.
    pub fn blocks_checkout_for(&self, user_id: &str) -> Option<String> {
        if self.ownership == OwnershipType::Employee
            && self.owner_user_id.as_deref() != Some(user_id)
        {
            return Some(format!(
                "Gauge {} is employee-owned by another user",
                self.id
            ));
        }
        if self.is_sealed && self.unseal_pending {
            return Some(format!(
                "Gauge {} is sealed with an unseal request pending",
                self.id
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn thread_gauge_data(id: i64) -> GaugeData {
        GaugeData {
            id,
            gauge_id: None,
            serial_number: Some(SerialNumber::new("SN0001").unwrap()),
            equipment_type: EquipmentType::ThreadGauge,
            category: None,
            ownership: OwnershipType::Company,
            owner_user_id: None,
            status: GaugeStatus::Available,
            is_sealed: false,
            unseal_pending: false,
            storage_location: Some("A1".to_string()),
            manufacturer: Some("Acme".to_string()),
            model: None,
            calibration_frequency_days: 365,
            suffix: None,
            companion_id: None,
            custom_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn paired(id: i64, companion: i64, suffix: GaugeSuffix) -> Gauge {
        let mut data = thread_gauge_data(id);
        data.gauge_id = Some("SP0222".to_string());
        data.suffix = Some(suffix);
        data.companion_id = Some(companion);
        Gauge::from_data(data).unwrap()
    }

    #[test]
    fn test_spare_has_no_public_label() {
        let spare = Gauge::from_data(thread_gauge_data(1)).unwrap();
        assert!(spare.is_spare());
        assert_eq!(spare.public_label(), None);
    }

    #[test]
    fn test_paired_member_label_includes_suffix() {
        let go = paired(1, 2, GaugeSuffix::A);
        assert_eq!(go.public_label().unwrap(), "SP0222A");
        assert!(!go.is_spare());
        assert!(go.is_paired());
    }

    #[test]
    fn test_thread_gauge_requires_serial() {
        let mut data = thread_gauge_data(1);
        data.serial_number = None;
        assert!(Gauge::from_data(data).is_err());
    }

    #[test]
    fn test_partial_set_assignment_rejected() {
        let mut data = thread_gauge_data(1);
        data.gauge_id = Some("SP0222".to_string());
        // Suffix and companion missing.
        assert!(Gauge::from_data(data).is_err());
    }

    #[test]
    fn test_pair_consistency_holds_for_valid_pair() {
        let go = paired(1, 2, GaugeSuffix::A);
        let nogo = paired(2, 1, GaugeSuffix::B);
        assert!(Gauge::check_pair_consistency(&go, &nogo).is_ok());
    }

    #[test]
    fn test_pair_consistency_rejects_same_suffix() {
        let go = paired(1, 2, GaugeSuffix::A);
        let other = paired(2, 1, GaugeSuffix::A);
        assert!(Gauge::check_pair_consistency(&go, &other).is_err());
    }

    #[test]
    fn test_pair_consistency_rejects_dangling_pointer() {
        let go = paired(1, 2, GaugeSuffix::A);
        let nogo = paired(2, 99, GaugeSuffix::B);
        assert!(Gauge::check_pair_consistency(&go, &nogo).is_err());
    }

    #[test]
    fn test_employee_ownership_blocks_other_users() {
        let mut data = thread_gauge_data(1);
        data.ownership = OwnershipType::Employee;
        data.owner_user_id = Some("u-owner".to_string());
        let gauge = Gauge::from_data(data).unwrap();
        assert!(gauge.blocks_checkout_for("u-other").is_some());
        assert!(gauge.blocks_checkout_for("u-owner").is_none());
    }

    #[test]
    fn test_sealed_with_pending_unseal_blocks_checkout() {
        let mut data = thread_gauge_data(1);
        data.is_sealed = true;
        data.unseal_pending = true;
        let gauge = Gauge::from_data(data).unwrap();
        assert!(gauge.blocks_checkout_for("anyone").is_some());
    }

    #[test]
    fn test_draft_validation() {
        let draft = GaugeDraft {
            gauge_id: None,
            serial_number: None,
            equipment_type: EquipmentType::ThreadGauge,
            category: None,
            ownership: OwnershipType::Company,
            owner_user_id: None,
            storage_location: None,
            manufacturer: None,
            model: None,
            calibration_frequency_days: 365,
            custom_name: None,
        };
        assert!(draft.validate().is_err(), "thread gauge needs serial");

        let ok = GaugeDraft {
            serial_number: Some(SerialNumber::new("ABC").unwrap()),
            ..draft.clone()
        };
        assert!(ok.validate().is_ok());

        let preassigned = GaugeDraft {
            gauge_id: Some("SP0001".to_string()),
            ..ok.clone()
        };
        assert!(
            preassigned.validate().is_err(),
            "set ids come from pairing, not intake"
        );
    }
}

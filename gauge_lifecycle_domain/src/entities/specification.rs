// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Specification Entity
//!
//! Per-equipment-type detail record, owned 1:1 by a gauge. The variant must
//! match the gauge's equipment type; the thread variant is additionally the
//! matching key when a set member is replaced by a spare (same size, form,
//! and class).

use serde::{Deserialize, Serialize};

use crate::value_objects::{EquipmentType, MeasurementUnit, ThreadSize};
use crate::GaugeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSpecification {
    pub thread_size: ThreadSize,
    pub thread_form: String,
    pub thread_class: String,
}

impl ThreadSpecification {
    /// Whether a spare with this specification may stand in for a member
    /// with `other`.
    pub fn matches(&self, other: &ThreadSpecification) -> bool {
        self.thread_size == other.thread_size
            && self.thread_form.eq_ignore_ascii_case(&other.thread_form)
            && self.thread_class.eq_ignore_ascii_case(&other.thread_class)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandToolSpecification {
    pub tool_format: String,
    pub range_min: f64,
    pub range_max: f64,
    pub unit: MeasurementUnit,
    pub resolution: Option<f64>,
    pub accuracy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeEquipmentSpecification {
    pub equipment_kind: String,
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStandardSpecification {
    pub standard_type: String,
    pub nominal_value: String,
    pub uncertainty: Option<String>,
}

/// The per-type detail record attached to every gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Specification {
    Thread(ThreadSpecification),
    HandTool(HandToolSpecification),
    LargeEquipment(LargeEquipmentSpecification),
    CalibrationStandard(CalibrationStandardSpecification),
}

impl Specification {
    /// The equipment type this variant belongs to.
    pub fn equipment_type(&self) -> EquipmentType {
        match self {
            Specification::Thread(_) => EquipmentType::ThreadGauge,
            Specification::HandTool(_) => EquipmentType::HandTool,
            Specification::LargeEquipment(_) => EquipmentType::LargeEquipment,
            Specification::CalibrationStandard(_) => EquipmentType::CalibrationStandard,
        }
    }

    /// Rejects a variant attached to the wrong equipment type.
    pub fn validate_for(&self, equipment_type: EquipmentType) -> Result<(), GaugeError> {
        if self.equipment_type() != equipment_type {
            return Err(GaugeError::validation_error(format!(
                "Specification variant {} does not match equipment type {}",
                self.equipment_type(),
                equipment_type
            )));
        }
        if let Specification::HandTool(spec) = self {
            if spec.range_min > spec.range_max {
                return Err(GaugeError::validation_error(
                    "Hand tool range minimum exceeds maximum",
                ));
            }
        }
        Ok(())
    }

    pub fn as_thread(&self) -> Option<&ThreadSpecification> {
        match self {
            Specification::Thread(spec) => Some(spec),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread_spec(size: &str) -> ThreadSpecification {
        ThreadSpecification {
            thread_size: ThreadSize::parse(size).unwrap(),
            thread_form: "UN".to_string(),
            thread_class: "2A".to_string(),
        }
    }

    #[test]
    fn test_thread_match_is_canonical() {
        // Fractional and decimal inputs land on the same canonical size.
        assert!(thread_spec("1/4-20").matches(&thread_spec(".250-20")));
        assert!(!thread_spec("1/4-20").matches(&thread_spec("1/4-28")));
    }

    #[test]
    fn test_thread_match_ignores_case() {
        let a = thread_spec("1/4-20");
        let mut b = thread_spec("1/4-20");
        b.thread_class = "2a".to_string();
        assert!(a.matches(&b));
    }

    #[test]
    fn test_variant_must_match_equipment_type() {
        let spec = Specification::Thread(thread_spec("1/4-20"));
        assert!(spec.validate_for(EquipmentType::ThreadGauge).is_ok());
        assert!(spec.validate_for(EquipmentType::HandTool).is_err());
    }

    #[test]
    fn test_hand_tool_range_order() {
        let spec = Specification::HandTool(HandToolSpecification {
            tool_format: "Micrometer".to_string(),
            range_min: 2.0,
            range_max: 1.0,
            unit: MeasurementUnit::Inch,
            resolution: None,
            accuracy: None,
        });
        assert!(spec.validate_for(EquipmentType::HandTool).is_err());
    }
}

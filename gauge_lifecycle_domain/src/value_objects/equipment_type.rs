// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Equipment Type Value Object
//!
//! The closed set of instrument categories tracked by the engine. The
//! equipment type decides which specification variant a gauge carries,
//! whether a serial number is mandatory, and which lookup paths apply
//! (thread gauges are the only type with spares and companion pairing).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

/// Instrument category.
///
/// Stored as its snake_case string form; parsing rejects anything outside
/// the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    ThreadGauge,
    HandTool,
    LargeEquipment,
    CalibrationStandard,
}

impl EquipmentType {
    /// Canonical string form used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::ThreadGauge => "thread_gauge",
            EquipmentType::HandTool => "hand_tool",
            EquipmentType::LargeEquipment => "large_equipment",
            EquipmentType::CalibrationStandard => "calibration_standard",
        }
    }

    /// Thread gauges must always carry a serial number; it is the only
    /// identity a spare has.
    pub fn requires_serial(&self) -> bool {
        matches!(self, EquipmentType::ThreadGauge)
    }

    /// Only thread gauges participate in GO/NO-GO companion sets.
    pub fn supports_pairing(&self) -> bool {
        matches!(self, EquipmentType::ThreadGauge)
    }

    /// All members of the closed set.
    pub fn all() -> [EquipmentType; 4] {
        [
            EquipmentType::ThreadGauge,
            EquipmentType::HandTool,
            EquipmentType::LargeEquipment,
            EquipmentType::CalibrationStandard,
        ]
    }
}

impl FromStr for EquipmentType {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thread_gauge" => Ok(EquipmentType::ThreadGauge),
            "hand_tool" => Ok(EquipmentType::HandTool),
            "large_equipment" => Ok(EquipmentType::LargeEquipment),
            "calibration_standard" => Ok(EquipmentType::CalibrationStandard),
            other => Err(GaugeError::validation_error(format!(
                "Unknown equipment type: {}",
                other
            ))),
        }
    }
}

impl Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

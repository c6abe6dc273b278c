// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Status Value Object
//!
//! The lifecycle states a gauge can occupy. Which state-to-state moves are
//! legal is owned by [`crate::services::state_machine`]; this type only
//! carries the closed set, its canonical string forms, and the terminal
//! classification.
//!
//! ## States
//!
//! - `available`: in storage, eligible for checkout or batching
//! - `checked_out`: held by a user under an active checkout
//! - `out_for_calibration`: member of a sent calibration batch
//! - `pending_certificate`: calibration passed, certificate not yet on file
//! - `pending_release`: certified, awaiting location verification
//! - `returned`: customer property handed back (terminal-for-rental)
//! - `out_of_service`: sidelined, may re-enter service
//! - `retired`: terminal; the gauge is never deleted
//! - `pending_qc`: awaiting post-use inspection
//! - `in_maintenance`: legacy import state; no live transition reaches it

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeStatus {
    Available,
    CheckedOut,
    OutForCalibration,
    PendingCertificate,
    PendingRelease,
    Returned,
    OutOfService,
    Retired,
    PendingQc,
    InMaintenance,
}

impl GaugeStatus {
    /// Canonical string form used in storage and audit payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            GaugeStatus::Available => "available",
            GaugeStatus::CheckedOut => "checked_out",
            GaugeStatus::OutForCalibration => "out_for_calibration",
            GaugeStatus::PendingCertificate => "pending_certificate",
            GaugeStatus::PendingRelease => "pending_release",
            GaugeStatus::Returned => "returned",
            GaugeStatus::OutOfService => "out_of_service",
            GaugeStatus::Retired => "retired",
            GaugeStatus::PendingQc => "pending_qc",
            GaugeStatus::InMaintenance => "in_maintenance",
        }
    }

    /// Retirement is the only terminal state; retired gauges keep their
    /// audit history but accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GaugeStatus::Retired)
    }

    /// States in which the gauge is physically in the calibration workflow.
    pub fn in_calibration_workflow(&self) -> bool {
        matches!(
            self,
            GaugeStatus::OutForCalibration
                | GaugeStatus::PendingCertificate
                | GaugeStatus::PendingRelease
        )
    }
}

impl FromStr for GaugeStatus {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(GaugeStatus::Available),
            "checked_out" => Ok(GaugeStatus::CheckedOut),
            "out_for_calibration" => Ok(GaugeStatus::OutForCalibration),
            "pending_certificate" => Ok(GaugeStatus::PendingCertificate),
            "pending_release" => Ok(GaugeStatus::PendingRelease),
            "returned" => Ok(GaugeStatus::Returned),
            "out_of_service" => Ok(GaugeStatus::OutOfService),
            "retired" => Ok(GaugeStatus::Retired),
            "pending_qc" => Ok(GaugeStatus::PendingQc),
            "in_maintenance" => Ok(GaugeStatus::InMaintenance),
            other => Err(GaugeError::validation_error(format!(
                "Unknown gauge status: {}",
                other
            ))),
        }
    }
}

impl Display for GaugeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [GaugeStatus; 10] = [
        GaugeStatus::Available,
        GaugeStatus::CheckedOut,
        GaugeStatus::OutForCalibration,
        GaugeStatus::PendingCertificate,
        GaugeStatus::PendingRelease,
        GaugeStatus::Returned,
        GaugeStatus::OutOfService,
        GaugeStatus::Retired,
        GaugeStatus::PendingQc,
        GaugeStatus::InMaintenance,
    ];

    #[test]
    fn test_round_trip_all_states() {
        for s in ALL {
            assert_eq!(s.as_str().parse::<GaugeStatus>().unwrap(), s);
        }
    }

    #[test]
    fn test_only_retired_is_terminal() {
        for s in ALL {
            assert_eq!(s.is_terminal(), s == GaugeStatus::Retired);
        }
    }

    #[test]
    fn test_calibration_workflow_states() {
        assert!(GaugeStatus::OutForCalibration.in_calibration_workflow());
        assert!(GaugeStatus::PendingCertificate.in_calibration_workflow());
        assert!(GaugeStatus::PendingRelease.in_calibration_workflow());
        assert!(!GaugeStatus::Available.in_calibration_workflow());
        assert!(!GaugeStatus::PendingQc.in_calibration_workflow());
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge State Machine
//!
//! The single source of truth for which lifecycle moves are legal. Every
//! application service validates against this table before writing a
//! status; the additional preconditions that need database context
//! (certificates on file, batch membership, companion state) are checked by
//! the owning service after the structural validation here passes.
//!
//! ## Transition table
//!
//! | from \ to          | avail | chk_out | out_cal | pend_cert | pend_rel | oos | retired | pend_qc |
//! |--------------------|:-----:|:-------:|:-------:|:---------:|:--------:|:---:|:-------:|:-------:|
//! | available          |   -   |    •    |    •    |           |          |  •  |    •    |    •    |
//! | checked_out        |   •   |    -    |         |           |          |  •  |    •    |    •    |
//! | out_for_calibration|       |         |    -    |     •     |          |  •  |    •    |         |
//! | pending_certificate|       |         |         |     -     |    •     |  •  |    •    |         |
//! | pending_release    |   •   |         |         |           |    -     |  •  |    •    |         |
//! | returned           |   •   |         |         |           |          |  •  |    •    |         |
//! | pending_qc         |   •   |         |         |           |          |  •  |    •    |    -    |
//! | out_of_service     |   •   |         |    •    |           |          |  -  |    •    |         |
//! | retired            |       |         |         |           |          |     |    -    |         |
//!
//! `returned` is entered only through the dedicated customer-return
//! operation; `in_maintenance` is a legacy import state with no live
//! transitions. Retirement is terminal.
//!
//! ## Cohorts
//!
//! When a transition is requested on a paired gauge, the companion moves
//! too for checkout, return, batch send, certificate verification, and
//! release. Sidelining (`out_of_service`), retirement of a single member,
//! QC routing, and per-gauge batch receipt move only the requested gauge.

use crate::entities::Gauge;
use crate::value_objects::{GaugeStatus, OwnershipType};
use crate::GaugeError;

/// Whether the table marks `from → to` as legal, preconditions aside.
pub fn is_legal(from: GaugeStatus, to: GaugeStatus) -> bool {
    use GaugeStatus::*;
    if from == to {
        return false;
    }
    match from {
        Available => matches!(to, CheckedOut | OutForCalibration | OutOfService | Retired | PendingQc),
        CheckedOut => matches!(to, Available | OutOfService | Retired | PendingQc),
        OutForCalibration => matches!(to, PendingCertificate | OutOfService | Retired),
        PendingCertificate => matches!(to, PendingRelease | OutOfService | Retired),
        PendingRelease => matches!(to, Available | OutOfService | Retired),
        Returned => matches!(to, Available | OutOfService | Retired),
        PendingQc => matches!(to, Available | OutOfService | Retired),
        OutOfService => matches!(to, Available | OutForCalibration | Retired),
        Retired => false,
        InMaintenance => false,
    }
}

/// Validates a move, returning `IllegalTransition` with context otherwise.
pub fn validate(from: GaugeStatus, to: GaugeStatus) -> Result<(), GaugeError> {
    if is_legal(from, to) {
        Ok(())
    } else {
        let reason = if from.is_terminal() {
            "retired is terminal"
        } else if from == to {
            "gauge is already in the requested status"
        } else {
            "transition is not in the lifecycle table"
        };
        Err(GaugeError::illegal_transition(
            from.as_str(),
            to.as_str(),
            reason,
        ))
    }
}

/// Gate for the dedicated customer-return path, which is deliberately
/// outside the table: only an available, customer-owned gauge may be
/// handed back.
pub fn validate_customer_return(gauge: &Gauge) -> Result<(), GaugeError> {
    if gauge.ownership() != OwnershipType::Customer {
        return Err(GaugeError::precondition_failed(format!(
            "Gauge {} is not customer property",
            gauge.id()
        )));
    }
    if gauge.status() != GaugeStatus::Available {
        return Err(GaugeError::illegal_transition(
            gauge.status().as_str(),
            GaugeStatus::Returned.as_str(),
            "customer returns accept available gauges only",
        ));
    }
    Ok(())
}

/// Requires the gauge to be in one of `expected`, with a
/// `PreconditionFailed` naming the rule otherwise.
pub fn require_status(gauge: &Gauge, expected: &[GaugeStatus], rule: &str) -> Result<(), GaugeError> {
    if expected.contains(&gauge.status()) {
        Ok(())
    } else {
        Err(GaugeError::precondition_failed(format!(
            "{}: gauge {} is {}",
            rule,
            gauge.id(),
            gauge.status()
        )))
    }
}

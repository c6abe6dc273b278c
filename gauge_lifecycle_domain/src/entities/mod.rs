// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain entities: identity-bearing objects with lifecycle and invariants.

pub mod active_checkout;
pub mod audit_entry;
pub mod calibration_batch;
pub mod calibration_schedule;
pub mod certificate;
pub mod gauge;
pub mod set_id_record;
pub mod specification;

pub use active_checkout::ActiveCheckout;
pub use audit_entry::AuditEntry;
pub use calibration_batch::{BatchMember, BatchStatus, BatchType, CalibrationBatch};
pub use calibration_schedule::CalibrationSchedule;
pub use certificate::Certificate;
pub use gauge::{Gauge, GaugeData, GaugeDraft};
pub use set_id_record::SetIdRecord;
pub use specification::{
    CalibrationStandardSpecification, HandToolSpecification, LargeEquipmentSpecification,
    Specification, ThreadSpecification,
};

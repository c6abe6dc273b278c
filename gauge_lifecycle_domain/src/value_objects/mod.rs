// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Value objects: immutable, validated domain primitives.
//!
//! Closed-set enumerations carry their canonical wire form (`as_str` /
//! `parse`) so the persistence layer converts exactly once at the row
//! boundary; newtypes validate on construction and never hold an invalid
//! value afterwards.

pub mod audit_severity;
pub mod capability;
pub mod equipment_type;
pub mod gauge_status;
pub mod gauge_suffix;
pub mod measurement_unit;
pub mod ownership_type;
pub mod serial_number;
pub mod set_id;
pub mod thread_size;

pub use audit_severity::AuditSeverity;
pub use capability::Capability;
pub use equipment_type::EquipmentType;
pub use gauge_status::GaugeStatus;
pub use gauge_suffix::GaugeSuffix;
pub use measurement_unit::MeasurementUnit;
pub use ownership_type::OwnershipType;
pub use serial_number::SerialNumber;
pub use set_id::SetId;
pub use thread_size::ThreadSize;

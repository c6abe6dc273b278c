// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Lifecycle Domain
//!
//! Pure business logic for the gauge lifecycle engine: the entities, value
//! objects, domain services, and events that govern measurement-instrument
//! state, pairing, checkout, calibration, and certification.
//!
//! ## Overview
//!
//! This crate contains no I/O. Persistence, transactions, and event
//! dispatch live in the `gauge-lifecycle` engine crate; everything here is
//! deterministic and synchronous so the rules can be tested without a
//! database:
//!
//! - **Entities**: `Gauge`, `Specification`, `Certificate`,
//!   `ActiveCheckout`, `CalibrationBatch`, `CalibrationSchedule`,
//!   `AuditEntry`, `SetIdRecord`
//! - **Value objects**: closed-set enumerations (equipment type, ownership,
//!   status, suffix, capability, severity, measurement unit) and validated
//!   newtypes (serial number, set id, thread size)
//! - **Domain services**: the state machine transition rules, the
//!   deterministic display-name policy, and the authorization gate
//! - **Events**: the canonical event set published by the engine
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`GaugeError`]; the error kind uniquely
//! determines recoverability at the boundary.

pub mod entities;
pub mod error;
pub mod events;
pub mod services;
pub mod value_objects;

pub use entities::{
    ActiveCheckout, AuditEntry, BatchMember, BatchStatus, BatchType, CalibrationBatch,
    CalibrationSchedule, Certificate, Gauge, GaugeDraft, SetIdRecord, Specification,
};
pub use error::GaugeError;
pub use events::*;
pub use services::authorization::{AuthorizationGate, Caller, Role};
pub use value_objects::{
    AuditSeverity, Capability, EquipmentType, GaugeStatus, GaugeSuffix, MeasurementUnit,
    OwnershipType, SerialNumber, SetId, ThreadSize,
};

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application services.
//!
//! Every operation follows the same discipline: authorize the caller,
//! run exactly one transaction through the core's guarded runner (stores
//! and audit appends inside it), then publish domain events after commit.
//! The guarded runner leaves critical audit evidence and an alert event
//! behind when a transaction surfaces an invariant violation.

pub mod audit_service;
pub mod batch_service;
pub mod certificate_service;
pub mod checkout_service;
pub mod context;
pub mod gauge_service;
pub mod pairing_service;

pub use audit_service::AuditService;
pub use batch_service::BatchService;
pub use certificate_service::{CertificateService, CertificateView};
pub use checkout_service::CheckoutService;
pub use context::GaugeLifecycleCore;
pub use gauge_service::GaugeService;
pub use pairing_service::{PairingService, SetHistory, SharedSetFields};

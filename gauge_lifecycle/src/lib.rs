// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Lifecycle Engine
//!
//! The authoritative server-side engine for measurement-instrument
//! lifecycle management: state transitions, GO/NO-GO pairing, checkout and
//! return, calibration batches, certificate chains, and a tamper-evident
//! audit log, all over SQLite with explicit transaction plumbing.
//!
//! ## Architecture
//!
//! - [`infrastructure`]: persistence (sqlx stores, schema migrations), the
//!   hash-chained audit log, the in-process event bus, and the transaction
//!   coordinator with transient-error retry
//! - [`application`]: the services implementing every exported operation,
//!   wired together by [`application::GaugeLifecycleCore`]
//!
//! Domain rules (entities, the state machine, display naming,
//! authorization) live in the `gauge-lifecycle-domain` crate; everything
//! here is orchestration and I/O.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gauge_lifecycle::application::GaugeLifecycleCore;
//! use gauge_lifecycle::infrastructure::config::CoreSettings;
//!
//! # async fn example() -> Result<(), gauge_lifecycle_domain::GaugeError> {
//! let core = GaugeLifecycleCore::connect("sqlite://gauges.db", CoreSettings::default()).await?;
//! let spares = core.gauges();
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod infrastructure;

pub use application::GaugeLifecycleCore;

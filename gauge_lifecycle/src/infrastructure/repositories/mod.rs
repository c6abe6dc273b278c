// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed stores.
//!
//! Every method takes an explicit `&mut SqliteConnection`; the caller owns
//! the transaction. Row shapes never leak: each store maps its rows onto
//! the canonical domain entities exactly once, converting SQLite's 0/1
//! integers to booleans and TEXT columns to typed enums on the way.

pub mod batch_store;
pub mod certificate_store;
pub mod checkout_store;
pub mod gauge_store;
pub mod schema;
pub mod set_id_store;

pub use batch_store::BatchStore;
pub use certificate_store::CertificateStore;
pub use checkout_store::CheckoutStore;
pub use gauge_store::{GaugeFilter, GaugePatch, GaugeStore, GaugeView, SpareFilter};
pub use set_id_store::SetIdStore;

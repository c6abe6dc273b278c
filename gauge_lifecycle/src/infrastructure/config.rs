// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Engine Settings
//!
//! Tunables the engine consults at runtime. Embedding binaries usually
//! load these from a TOML file through the bootstrap crate; tests take the
//! defaults.

use std::collections::HashSet;
use std::time::Duration;

use gauge_lifecycle_domain::EquipmentType;

/// Runtime settings for the engine.
#[derive(Debug, Clone)]
pub struct CoreSettings {
    /// Upper bound on one transaction body.
    pub query_timeout: Duration,
    /// Upper bound on acquiring a pooled connection.
    pub acquire_timeout: Duration,
    /// Attempts for transient database failures (first try included).
    pub retry_attempts: u32,
    /// Initial backoff between retries; doubles per attempt.
    pub retry_backoff: Duration,
    /// Audit entries older than this move to the archive table.
    pub audit_retention_days: i64,
    /// Prefix for allocator-issued thread-gauge set ids.
    pub set_id_prefix: String,
    /// Zero-padded width of the allocator's numeric tail.
    pub set_id_width: usize,
    /// Equipment types routed to pending_qc on return instead of available.
    pub qc_on_return: HashSet<EquipmentType>,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(15),
            acquire_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(500),
            audit_retention_days: 730,
            set_id_prefix: "SP".to_string(),
            set_id_width: 4,
            qc_on_return: HashSet::new(),
        }
    }
}

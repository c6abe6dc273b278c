// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Audit Entry Entity
//!
//! One tamper-evident record in the append-only audit chain. Every entry's
//! hash covers its own fields plus the previous entry's hash, so modifying
//! any committed entry breaks verification from that sequence number on.
//!
//! ## Canonical hash input
//!
//! SHA-256 over the pipe-joined canonical string
//!
//! ```text
//! seq|timestamp|actor|action|entity_type|entity_id|before|after|severity|previous_hash
//! ```
//!
//! with the timestamp in RFC 3339 (microsecond precision, UTC `Z`) and the
//! payloads as compact JSON (`null` when absent). serde_json's map ordering
//! is deterministic, so equal payloads always hash equally. The first
//! entry's `previous_hash` is the empty string.
//!
//! Entries are never updated or deleted; aged entries move to a separate
//! append-only archive.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::value_objects::AuditSeverity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub seq: i64,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub severity: AuditSeverity,
    /// Hash of the previous entry; empty for the first entry in the chain.
    pub previous_hash: String,
    /// SHA-256 hex of this entry's canonical string.
    pub entry_hash: String,
}

impl AuditEntry {
    /// Computes the chain hash for an entry's fields.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_hash(
        seq: i64,
        timestamp: DateTime<Utc>,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        before: Option<&serde_json::Value>,
        after: Option<&serde_json::Value>,
        severity: AuditSeverity,
        previous_hash: &str,
    ) -> String {
        let canonical = format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            seq,
            timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            actor,
            action,
            entity_type,
            entity_id,
            payload_str(before),
            payload_str(after),
            severity.as_str(),
            previous_hash,
        );
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Recomputes this entry's hash from its fields.
    pub fn recompute_hash(&self) -> String {
        Self::compute_hash(
            self.seq,
            self.timestamp,
            &self.actor,
            &self.action,
            &self.entity_type,
            &self.entity_id,
            self.before.as_ref(),
            self.after.as_ref(),
            self.severity,
            &self.previous_hash,
        )
    }

    /// Whether the stored hash matches the entry's fields.
    pub fn is_intact(&self) -> bool {
        self.entry_hash == self.recompute_hash()
    }
}

fn payload_str(payload: Option<&serde_json::Value>) -> String {
    match payload {
        Some(value) => value.to_string(),
        None => "null".to_string(),
    }
}

/// Walks a contiguous slice of entries and returns the first sequence
/// number whose hash or back-link fails verification, if any.
///
/// `expected_previous` is the hash the first entry must link back to
/// (empty string at the start of the chain).
pub fn first_invalid_seq(entries: &[AuditEntry], expected_previous: &str) -> Option<i64> {
    let mut previous = expected_previous.to_string();
    for entry in entries {
        if entry.previous_hash != previous || !entry.is_intact() {
            return Some(entry.seq);
        }
        previous = entry.entry_hash.clone();
    }
    None
}

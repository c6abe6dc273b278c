// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Active checkout record: one per checked-out gauge, deleted on return.
//! A unique index on the gauge reference makes double-checkout impossible
//! at the storage layer; the engine translates that conflict into
//! `AlreadyCheckedOut`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveCheckout {
    pub id: i64,
    pub gauge_ref: i64,
    pub user_id: String,
    pub checked_out_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ActiveCheckout {
    /// A repeated checkout by the same holder with the same notes is a
    /// no-op; the engine returns the existing row.
    pub fn is_same_request(&self, user_id: &str, notes: Option<&str>) -> bool {
        self.user_id == user_id && self.notes.as_deref() == notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_request_detection() {
        let ac = ActiveCheckout {
            id: 1,
            gauge_ref: 7,
            user_id: "u-1".to_string(),
            checked_out_at: Utc::now(),
            notes: Some("job X".to_string()),
        };
        assert!(ac.is_same_request("u-1", Some("job X")));
        assert!(!ac.is_same_request("u-1", Some("job Y")));
        assert!(!ac.is_same_request("u-2", Some("job X")));
        assert!(!ac.is_same_request("u-1", None));
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Set-ID History record: the ledger of every public set identifier ever
//! assigned. Presence alone burns the id for new sets; `retired_at` is
//! stamped only when the whole set is retired. Unpairing leaves the row
//! untouched so the historical question "which gauges were in SP0222 on
//! date D" keeps exactly one answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::SetId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIdRecord {
    pub set_id: SetId,
    pub first_used_at: DateTime<Utc>,
    pub retired_at: Option<DateTime<Utc>>,
}

impl SetIdRecord {
    pub fn new(set_id: SetId, first_used_at: DateTime<Utc>) -> Self {
        Self {
            set_id,
            first_used_at,
            retired_at: None,
        }
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Calibration schedule: one per gauge, derived from certificate uploads
//! and the gauge's calibration frequency. External reminder services read
//! this table; the engine only rolls it forward.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSchedule {
    pub gauge_ref: i64,
    pub frequency_days: i64,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
}

impl CalibrationSchedule {
    /// A fresh schedule for a gauge with no calibration on record.
    pub fn new(gauge_ref: i64, frequency_days: i64) -> Self {
        Self {
            gauge_ref,
            frequency_days,
            last_completed_at: None,
            next_due_at: None,
        }
    }

    /// Rolls the schedule forward after a completed calibration.
    pub fn roll_forward(&mut self, completed_at: DateTime<Utc>) {
        self.last_completed_at = Some(completed_at);
        self.next_due_at = Some(completed_at + Duration::days(self.frequency_days));
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.next_due_at.map_or(false, |due| due < now)
    }
}

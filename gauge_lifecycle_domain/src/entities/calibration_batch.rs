// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Calibration Batch Entity
//!
//! A group of gauges sent through calibration together, internal or
//! external. The batch drives coordinated member transitions: sending moves
//! every member to `out_for_calibration`; receiving moves each member
//! individually (pass → `pending_certificate`, fail → `retired`) and the
//! batch completes once every member has been received.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchType {
    Internal,
    External,
}

impl BatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchType::Internal => "internal",
            BatchType::External => "external",
        }
    }
}

impl FromStr for BatchType {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(BatchType::Internal),
            "external" => Ok(BatchType::External),
            other => Err(GaugeError::validation_error(format!(
                "Unknown batch type: {}",
                other
            ))),
        }
    }
}

impl Display for BatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    PendingSend,
    Sent,
    PartiallyReceived,
    Completed,
    Cancelled,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::PendingSend => "pending_send",
            BatchStatus::Sent => "sent",
            BatchStatus::PartiallyReceived => "partially_received",
            BatchStatus::Completed => "completed",
            BatchStatus::Cancelled => "cancelled",
        }
    }

    /// A gauge may belong to at most one non-terminal batch.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            BatchStatus::PendingSend | BatchStatus::Sent | BatchStatus::PartiallyReceived
        )
    }
}

impl FromStr for BatchStatus {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_send" => Ok(BatchStatus::PendingSend),
            "sent" => Ok(BatchStatus::Sent),
            "partially_received" => Ok(BatchStatus::PartiallyReceived),
            "completed" => Ok(BatchStatus::Completed),
            "cancelled" => Ok(BatchStatus::Cancelled),
            other => Err(GaugeError::validation_error(format!(
                "Unknown batch status: {}",
                other
            ))),
        }
    }
}

impl Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationBatch {
    pub id: i64,
    pub batch_type: BatchType,
    pub vendor: Option<String>,
    pub tracking_number: Option<String>,
    pub status: BatchStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl CalibrationBatch {
    /// Creation-time rules: external batches name their vendor.
    pub fn validate_new(batch_type: BatchType, vendor: Option<&str>) -> Result<(), GaugeError> {
        if batch_type == BatchType::External && vendor.map_or(true, |v| v.trim().is_empty()) {
            return Err(GaugeError::validation_error(
                "External calibration batches require a vendor",
            ));
        }
        Ok(())
    }

    /// Membership changes are only allowed before the batch is sent.
    pub fn accepts_membership_changes(&self) -> bool {
        self.status == BatchStatus::PendingSend
    }

    /// Only an unsent batch may be cancelled; members are left untouched.
    pub fn can_cancel(&self) -> bool {
        self.status == BatchStatus::PendingSend
    }
}

/// Per-gauge membership row, carrying receive state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMember {
    pub batch_id: i64,
    pub gauge_ref: i64,
    pub received_at: Option<DateTime<Utc>>,
    pub calibration_passed: Option<bool>,
}

impl BatchMember {
    pub fn is_received(&self) -> bool {
        self.received_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_requires_vendor() {
        assert!(CalibrationBatch::validate_new(BatchType::External, None).is_err());
        assert!(CalibrationBatch::validate_new(BatchType::External, Some("  ")).is_err());
        assert!(CalibrationBatch::validate_new(BatchType::External, Some("MetroCal")).is_ok());
        assert!(CalibrationBatch::validate_new(BatchType::Internal, None).is_ok());
    }

    #[test]
    fn test_open_statuses() {
        assert!(BatchStatus::PendingSend.is_open());
        assert!(BatchStatus::Sent.is_open());
        assert!(BatchStatus::PartiallyReceived.is_open());
        assert!(!BatchStatus::Completed.is_open());
        assert!(!BatchStatus::Cancelled.is_open());
    }

    #[test]
    fn test_cancel_window() {
        let batch = CalibrationBatch {
            id: 1,
            batch_type: BatchType::External,
            vendor: Some("MetroCal".to_string()),
            tracking_number: None,
            status: BatchStatus::PendingSend,
            sent_at: None,
            created_by: "u-1".to_string(),
            created_at: Utc::now(),
        };
        assert!(batch.can_cancel());
        assert!(batch.accepts_membership_changes());

        let sent = CalibrationBatch {
            status: BatchStatus::Sent,
            sent_at: Some(Utc::now()),
            ..batch
        };
        assert!(!sent.can_cancel());
        assert!(!sent.accepts_membership_changes());
    }
}

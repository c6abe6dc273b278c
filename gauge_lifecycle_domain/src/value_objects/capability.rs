// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Capability Value Object
//!
//! The closed set of permissions the authorization gate enforces. Every
//! core operation names exactly one required capability; a caller's
//! permission set is resolved at the external boundary and handed in as a
//! verified fact.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    GaugeView,
    GaugeOperate,
    GaugeManage,
    CalibrationManage,
    UserManage,
    SystemAdmin,
    AuditView,
    DataExport,
}

impl Capability {
    /// Dotted wire form (`gauge.view`, `system.admin`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::GaugeView => "gauge.view",
            Capability::GaugeOperate => "gauge.operate",
            Capability::GaugeManage => "gauge.manage",
            Capability::CalibrationManage => "calibration.manage",
            Capability::UserManage => "user.manage",
            Capability::SystemAdmin => "system.admin",
            Capability::AuditView => "audit.view",
            Capability::DataExport => "data.export",
        }
    }
}

impl FromStr for Capability {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gauge.view" => Ok(Capability::GaugeView),
            "gauge.operate" => Ok(Capability::GaugeOperate),
            "gauge.manage" => Ok(Capability::GaugeManage),
            "calibration.manage" => Ok(Capability::CalibrationManage),
            "user.manage" => Ok(Capability::UserManage),
            "system.admin" => Ok(Capability::SystemAdmin),
            "audit.view" => Ok(Capability::AuditView),
            "data.export" => Ok(Capability::DataExport),
            other => Err(GaugeError::validation_error(format!(
                "Unknown capability: {}",
                other
            ))),
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for c in [
            Capability::GaugeView,
            Capability::GaugeOperate,
            Capability::GaugeManage,
            Capability::CalibrationManage,
            Capability::UserManage,
            Capability::SystemAdmin,
            Capability::AuditView,
            Capability::DataExport,
        ] {
            assert_eq!(c.as_str().parse::<Capability>().unwrap(), c);
        }
    }
}

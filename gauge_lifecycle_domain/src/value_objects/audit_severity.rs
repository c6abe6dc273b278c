// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Audit entry severity.
//!
//! `info` for routine transitions, `warning` for policy overrides (e.g. a
//! single-admin self-change), `critical` for security-relevant events such
//! as failed authorization or invariant violations.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

impl AuditSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Info => "info",
            AuditSeverity::Warning => "warning",
            AuditSeverity::Critical => "critical",
        }
    }
}

impl FromStr for AuditSeverity {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(AuditSeverity::Info),
            "warning" => Ok(AuditSeverity::Warning),
            "critical" => Ok(AuditSeverity::Critical),
            other => Err(GaugeError::validation_error(format!(
                "Unknown audit severity: {}",
                other
            ))),
        }
    }
}

impl Display for AuditSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for s in [
            AuditSeverity::Info,
            AuditSeverity::Warning,
            AuditSeverity::Critical,
        ] {
            assert_eq!(s.as_str().parse::<AuditSeverity>().unwrap(), s);
        }
    }
}

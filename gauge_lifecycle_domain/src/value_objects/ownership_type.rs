// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Ownership classification for a gauge.
//!
//! Employee-owned gauges restrict checkout to the owning user; customer
//! property follows the rental path (`returned` status) and bypasses the
//! calibration workflow.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipType {
    Company,
    Employee,
    Customer,
}

impl OwnershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnershipType::Company => "company",
            OwnershipType::Employee => "employee",
            OwnershipType::Customer => "customer",
        }
    }
}

impl FromStr for OwnershipType {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "company" => Ok(OwnershipType::Company),
            "employee" => Ok(OwnershipType::Employee),
            "customer" => Ok(OwnershipType::Customer),
            other => Err(GaugeError::validation_error(format!(
                "Unknown ownership type: {}",
                other
            ))),
        }
    }
}

impl Display for OwnershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for o in [
            OwnershipType::Company,
            OwnershipType::Employee,
            OwnershipType::Customer,
        ] {
            assert_eq!(o.as_str().parse::<OwnershipType>().unwrap(), o);
        }
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Serial Number Value Object
//!
//! Manufacturer serial number, the sole identity of a spare thread gauge.
//! Input is trimmed and uppercased on construction; the stored form is
//! always canonical. Uniqueness (per equipment type, among non-retired
//! gauges) is enforced by the store, not here.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

/// Maximum accepted length after trimming.
const MAX_LEN: usize = 64;

/// A validated, canonically-uppercased serial number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Creates a serial number from raw input.
    ///
    /// Trims surrounding whitespace and uppercases; rejects empty input and
    /// input longer than 64 characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GaugeError> {
        let canonical = raw.as_ref().trim().to_uppercase();
        if canonical.is_empty() {
            return Err(GaugeError::validation_error(
                "Serial number cannot be empty",
            ));
        }
        if canonical.len() > MAX_LEN {
            return Err(GaugeError::validation_error(format!(
                "Serial number exceeds {} characters",
                MAX_LEN
            )));
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for SerialNumber {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uppercased_and_trimmed() {
        let sn = SerialNumber::new("  abc123 ").unwrap();
        assert_eq!(sn.as_str(), "ABC123");
    }

    #[test]
    fn test_empty_rejected() {
        assert!(SerialNumber::new("").is_err());
        assert!(SerialNumber::new("   ").is_err());
    }

    #[test]
    fn test_length_bound() {
        let max = "X".repeat(64);
        assert!(SerialNumber::new(&max).is_ok());
        let over = "X".repeat(65);
        assert!(SerialNumber::new(&over).is_err());
    }

    proptest! {
        #[test]
        fn prop_construction_is_idempotent(raw in "[a-zA-Z0-9-]{1,64}") {
            let once = SerialNumber::new(&raw).unwrap();
            let twice = SerialNumber::new(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_never_stores_lowercase(raw in "[a-z]{1,32}") {
            let sn = SerialNumber::new(&raw).unwrap();
            prop_assert!(sn.as_str().chars().all(|c| !c.is_lowercase()));
        }
    }
}

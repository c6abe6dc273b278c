// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Set Id Value Object
//!
//! The shared public identifier of a GO/NO-GO thread-gauge set, e.g.
//! `SP0222`. A set id that has ever been assigned is burned forever for new
//! sets (Set-ID History is the ledger); the allocator walks candidates via
//! [`SetId::successor`] until it finds one never used.
//!
//! The id itself is suffix-free. A member's full public label is the set id
//! with its companion suffix appended (`SP0222A` / `SP0222B`).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::value_objects::GaugeSuffix;
use crate::GaugeError;

/// A validated thread-gauge set identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(String);

impl SetId {
    /// Creates a set id from raw input.
    ///
    /// Uppercases, then requires 2–16 ASCII alphanumeric characters ending
    /// in at least one digit (the numeric tail the allocator increments).
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GaugeError> {
        let canonical = raw.as_ref().trim().to_uppercase();
        if canonical.len() < 2 || canonical.len() > 16 {
            return Err(GaugeError::validation_error(
                "Set id must be 2-16 characters",
            ));
        }
        if !canonical.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GaugeError::validation_error(
                "Set id must be ASCII alphanumeric",
            ));
        }
        if !canonical.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(GaugeError::validation_error(
                "Set id must end with a numeric tail",
            ));
        }
        Ok(Self(canonical))
    }

    /// Formats an id from an allocator prefix and counter, zero-padded to
    /// `width` digits (`("SP", 222, 4)` → `SP0222`).
    pub fn format(prefix: &str, counter: u64, width: usize) -> Result<Self, GaugeError> {
        Self::new(format!("{}{:0width$}", prefix, counter, width = width))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits into alphabetic prefix and numeric tail (`SP0222` → `("SP", 222)`).
    pub fn split(&self) -> (&str, u64) {
        let tail_start = self
            .0
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|i| i + 1)
            .unwrap_or(0);
        let tail = &self.0[tail_start..];
        // Validated to end in a digit, so the tail always parses.
        (&self.0[..tail_start], tail.parse().unwrap_or(0))
    }

    /// Numeric tail of the id.
    pub fn counter(&self) -> u64 {
        self.split().1
    }

    /// The next candidate id: same prefix, counter + 1, same tail width.
    pub fn successor(&self) -> Result<SetId, GaugeError> {
        let tail_start = self
            .0
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|i| i + 1)
            .unwrap_or(0);
        let width = self.0.len() - tail_start;
        let (prefix, counter) = self.split();
        Self::format(prefix, counter + 1, width)
    }

    /// Full public label of one member: set id plus suffix character.
    pub fn member_label(&self, suffix: GaugeSuffix) -> String {
        format!("{}{}", self.0, suffix.as_char())
    }
}

impl FromStr for SetId {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_split() {
        let id = SetId::format("SP", 222, 4).unwrap();
        assert_eq!(id.as_str(), "SP0222");
        assert_eq!(id.split(), ("SP", 222));
    }

    #[test]
    fn test_successor_preserves_width() {
        let id = SetId::new("SP0222").unwrap();
        assert_eq!(id.successor().unwrap().as_str(), "SP0223");
        let id = SetId::new("SP0999").unwrap();
        assert_eq!(id.successor().unwrap().as_str(), "SP1000");
    }

    #[test]
    fn test_member_labels() {
        let id = SetId::new("SP0222").unwrap();
        assert_eq!(id.member_label(GaugeSuffix::A), "SP0222A");
        assert_eq!(id.member_label(GaugeSuffix::B), "SP0222B");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(SetId::new("").is_err());
        assert!(SetId::new("S").is_err());
        assert!(SetId::new("SP-222").is_err());
        assert!(SetId::new("SPAAAA").is_err(), "must end in a digit");
        assert!(SetId::new("SP00221111111111111").is_err());
    }

    #[test]
    fn test_uppercased_on_input() {
        assert_eq!(SetId::new("sp0222").unwrap().as_str(), "SP0222");
    }
}

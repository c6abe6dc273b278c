// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Measurement Unit Value Object
//!
//! Units for hand-tool measurement ranges, with the fixed display-symbol
//! table the naming policy depends on. Symbols are appended directly to the
//! range (`0-1"`), so some carry a leading space (`0-150 PSI`).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
    Inch,
    Millimeter,
    Degree,
    Psi,
    Bar,
    Centimeter,
    Foot,
}

impl MeasurementUnit {
    /// Canonical storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementUnit::Inch => "inch",
            MeasurementUnit::Millimeter => "mm",
            MeasurementUnit::Degree => "deg",
            MeasurementUnit::Psi => "psi",
            MeasurementUnit::Bar => "bar",
            MeasurementUnit::Centimeter => "cm",
            MeasurementUnit::Foot => "ft",
        }
    }

    /// Display symbol appended to a measurement range.
    pub fn symbol(&self) -> &'static str {
        match self {
            MeasurementUnit::Inch => "\"",
            MeasurementUnit::Millimeter => "mm",
            MeasurementUnit::Degree => "\u{00B0}",
            MeasurementUnit::Psi => " PSI",
            MeasurementUnit::Bar => " bar",
            MeasurementUnit::Centimeter => "cm",
            MeasurementUnit::Foot => "ft",
        }
    }
}

impl FromStr for MeasurementUnit {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inch" | "in" => Ok(MeasurementUnit::Inch),
            "mm" => Ok(MeasurementUnit::Millimeter),
            "deg" | "degree" => Ok(MeasurementUnit::Degree),
            "psi" => Ok(MeasurementUnit::Psi),
            "bar" => Ok(MeasurementUnit::Bar),
            "cm" => Ok(MeasurementUnit::Centimeter),
            "ft" | "foot" => Ok(MeasurementUnit::Foot),
            other => Err(GaugeError::validation_error(format!(
                "Unknown measurement unit: {}",
                other
            ))),
        }
    }
}

impl Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        assert_eq!(MeasurementUnit::Inch.symbol(), "\"");
        assert_eq!(MeasurementUnit::Millimeter.symbol(), "mm");
        assert_eq!(MeasurementUnit::Degree.symbol(), "\u{00B0}");
        assert_eq!(MeasurementUnit::Psi.symbol(), " PSI");
        assert_eq!(MeasurementUnit::Bar.symbol(), " bar");
    }

    #[test]
    fn test_canonical_round_trip() {
        for u in [
            MeasurementUnit::Inch,
            MeasurementUnit::Millimeter,
            MeasurementUnit::Degree,
            MeasurementUnit::Psi,
            MeasurementUnit::Bar,
            MeasurementUnit::Centimeter,
            MeasurementUnit::Foot,
        ] {
            assert_eq!(u.as_str().parse::<MeasurementUnit>().unwrap(), u);
        }
    }
}

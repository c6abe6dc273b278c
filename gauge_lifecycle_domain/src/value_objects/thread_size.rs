// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Thread Size Value Object
//!
//! Thread designation in canonical decimal form per ANSI B1.1.
//!
//! ## Accepted input forms
//!
//! - **Fractional**: `1/4-20` (numerator/denominator inch diameter, pitch)
//! - **Numbered**: `10-32` or `#10-32` (machine-screw number 0–12; the
//!   major diameter is `0.060 + 0.013 × n` inches)
//! - **Decimal**: `.250-20` or `0.250-20`
//!
//! All three are stored canonically as `.250-20`: a leading-dot decimal
//! diameter with at least three decimal places, a dash, and the integer
//! threads-per-inch pitch. Spare matching during companion replacement
//! compares canonical forms, so `1/4-20` and `.250-20` are the same size.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

static FRACTIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)/(\d+)$").unwrap());
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0?\.(\d{2,4})$").unwrap());
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?(\d{1,2})$").unwrap());

/// A thread designation held in canonical decimal form (`.250-20`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadSize(String);

impl ThreadSize {
    /// Parses any accepted form into canonical decimal form.
    pub fn parse(raw: &str) -> Result<Self, GaugeError> {
        let trimmed = raw.trim();
        let (size_part, pitch_part) = trimmed.rsplit_once('-').ok_or_else(|| {
            GaugeError::validation_error(format!(
                "Thread size must be <size>-<pitch>, got {:?}",
                raw
            ))
        })?;

        let pitch: u32 = pitch_part.trim().parse().map_err(|_| {
            GaugeError::validation_error(format!("Thread pitch must be numeric, got {:?}", pitch_part))
        })?;
        if pitch == 0 {
            return Err(GaugeError::validation_error("Thread pitch cannot be zero"));
        }

        let size_part = size_part.trim();
        let diameter = if let Some(caps) = FRACTIONAL.captures(size_part) {
            let num: f64 = caps[1].parse().unwrap_or(0.0);
            let den: f64 = caps[2].parse().unwrap_or(0.0);
            if den == 0.0 {
                return Err(GaugeError::validation_error(
                    "Fractional thread size has zero denominator",
                ));
            }
            num / den
        } else if DECIMAL.is_match(size_part) {
            size_part.parse::<f64>().map_err(|_| {
                GaugeError::validation_error(format!("Invalid decimal thread size: {:?}", size_part))
            })?
        } else if let Some(caps) = NUMBERED.captures(size_part) {
            let n: u32 = caps[1].parse().unwrap_or(0);
            if n > 12 {
                return Err(GaugeError::validation_error(format!(
                    "Numbered thread sizes run 0-12, got {}",
                    n
                )));
            }
            0.060 + 0.013 * f64::from(n)
        } else {
            return Err(GaugeError::validation_error(format!(
                "Unrecognized thread size: {:?}",
                size_part
            )));
        };

        if diameter <= 0.0 || diameter >= 10.0 {
            return Err(GaugeError::validation_error(format!(
                "Thread diameter out of range: {}",
                diameter
            )));
        }

        Ok(Self(format!("{}-{}", format_diameter(diameter), pitch)))
    }

    /// Canonical `.250-20` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decimal diameter portion (`.250`).
    pub fn decimal_size(&self) -> &str {
        self.0.rsplit_once('-').map(|(s, _)| s).unwrap_or(&self.0)
    }

    /// Threads-per-inch portion (`20`).
    pub fn pitch(&self) -> &str {
        self.0.rsplit_once('-').map(|(_, p)| p).unwrap_or("")
    }
}

/// Formats an inch diameter as a leading-dot decimal with three or four
/// places (`0.25` → `.250`, `0.3125` → `.3125`).
fn format_diameter(diameter: f64) -> String {
    let mut s = format!("{:.4}", diameter);
    if s.ends_with('0') {
        s.pop();
    }
    if let Some(stripped) = s.strip_prefix('0') {
        stripped.to_string()
    } else {
        s
    }
}

impl FromStr for ThreadSize {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for ThreadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

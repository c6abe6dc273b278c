// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Companion-set member suffix: `A` marks the GO gauge, `B` the NO-GO.
//!
//! The suffix appended to the shared set id forms the member's full public
//! label (`SP0222` + `A` = `SP0222A`). Companions always carry opposite
//! suffixes.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::GaugeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GaugeSuffix {
    A,
    B,
}

impl GaugeSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            GaugeSuffix::A => "A",
            GaugeSuffix::B => "B",
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            GaugeSuffix::A => 'A',
            GaugeSuffix::B => 'B',
        }
    }

    /// The companion's suffix.
    pub fn opposite(&self) -> GaugeSuffix {
        match self {
            GaugeSuffix::A => GaugeSuffix::B,
            GaugeSuffix::B => GaugeSuffix::A,
        }
    }

    /// Human-facing function label used in display names.
    pub fn function_label(&self) -> &'static str {
        match self {
            GaugeSuffix::A => "GO",
            GaugeSuffix::B => "NO GO",
        }
    }
}

impl FromStr for GaugeSuffix {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(GaugeSuffix::A),
            "B" => Ok(GaugeSuffix::B),
            other => Err(GaugeError::validation_error(format!(
                "Gauge suffix must be A or B, got {}",
                other
            ))),
        }
    }
}

impl Display for GaugeSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Display Name Policy
//!
//! Deterministic, computed-on-read display names. A user-supplied custom
//! name always wins; otherwise the name is derived from the specification:
//!
//! - Thread gauge: `.250-20 UN 2A Thread GO Gauge`
//! - Spare thread gauge (no public id): `S/N ABC123`
//! - Hand tool: `0-1" Micrometer`
//! - Large equipment: `CMM (48x60)` or `CMM`
//! - Calibration standard: `Gauge Block .500 ±.000050`
//!
//! Nothing here is stored; the store recomputes the name whenever the
//! inputs change, so renames of specification fields are reflected
//! everywhere immediately.

use crate::entities::{Gauge, Specification};

/// Computes the display name for a gauge and its specification.
pub fn display_name(gauge: &Gauge, spec: Option<&Specification>) -> String {
    if let Some(custom) = gauge.custom_name() {
        return custom.to_string();
    }

    match spec {
        Some(Specification::Thread(thread)) => {
            if gauge.is_spare() {
                return spare_name(gauge);
            }
            let function = gauge
                .suffix()
                .map(|s| s.function_label())
                .unwrap_or("Thread");
            format!(
                "{} {} {} Thread {} Gauge",
                thread.thread_size.as_str(),
                thread.thread_form,
                thread.thread_class,
                function
            )
        }
        Some(Specification::HandTool(tool)) => {
            format!(
                "{}-{}{} {}",
                format_measure(tool.range_min),
                format_measure(tool.range_max),
                tool.unit.symbol(),
                tool.tool_format
            )
        }
        Some(Specification::LargeEquipment(le)) => match &le.capacity {
            Some(capacity) => format!("{} ({})", le.equipment_kind, capacity),
            None => le.equipment_kind.clone(),
        },
        Some(Specification::CalibrationStandard(cs)) => match &cs.uncertainty {
            Some(uncertainty) => {
                format!("{} {} {}", cs.standard_type, cs.nominal_value, uncertainty)
            }
            None => format!("{} {}", cs.standard_type, cs.nominal_value),
        },
        None => gauge
            .public_label()
            .or_else(|| spare_name_opt(gauge))
            .unwrap_or_else(|| format!("Gauge {}", gauge.id())),
    }
}

fn spare_name(gauge: &Gauge) -> String {
    spare_name_opt(gauge).unwrap_or_else(|| format!("Gauge {}", gauge.id()))
}

fn spare_name_opt(gauge: &Gauge) -> Option<String> {
    gauge
        .serial_number()
        .map(|serial| format!("S/N {}", serial))
}

/// Shortest decimal form of a range bound: whole numbers lose the
/// fractional part, everything else keeps it (`1.0` → `1`, `0.5` → `0.5`).
fn format_measure(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared fixtures for the integration tests: an in-memory engine with the
//! full schema, canned callers, and thread-gauge seeding helpers.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;

use gauge_lifecycle::application::GaugeLifecycleCore;
use gauge_lifecycle::infrastructure::config::CoreSettings;
use gauge_lifecycle::infrastructure::repositories::schema;
use gauge_lifecycle_domain::entities::{GaugeDraft, Specification, ThreadSpecification};
use gauge_lifecycle_domain::{
    Caller, Capability, EquipmentType, OwnershipType, Role, SerialNumber, ThreadSize,
};

pub async fn test_core() -> GaugeLifecycleCore {
    test_core_with(CoreSettings::default()).await
}

pub async fn test_core_with(settings: CoreSettings) -> GaugeLifecycleCore {
    // One connection: an in-memory SQLite database is per-connection, so a
    // wider pool would hand tests empty databases.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    schema::ensure_schema(&pool).await.expect("schema");
    GaugeLifecycleCore::new(pool, settings)
}

/// Calibration-lab manager: everything except system administration.
pub fn manager() -> Caller {
    Caller::new(
        "u-manager",
        Role::Admin,
        [
            Capability::GaugeView,
            Capability::GaugeOperate,
            Capability::GaugeManage,
            Capability::CalibrationManage,
            Capability::AuditView,
            Capability::DataExport,
        ],
    )
}

/// Shop-floor operator: view and operate only.
pub fn operator() -> Caller {
    Caller::new(
        "u-operator",
        Role::Operator,
        [Capability::GaugeView, Capability::GaugeOperate],
    )
}

pub fn second_operator() -> Caller {
    Caller::new(
        "u-operator-2",
        Role::Operator,
        [Capability::GaugeView, Capability::GaugeOperate],
    )
}

pub fn system_admin() -> Caller {
    Caller::new("u-root", Role::SystemAdmin, [Capability::SystemAdmin])
}

pub fn thread_draft(serial: &str) -> GaugeDraft {
    GaugeDraft {
        gauge_id: None,
        serial_number: Some(SerialNumber::new(serial).unwrap()),
        equipment_type: EquipmentType::ThreadGauge,
        category: None,
        ownership: OwnershipType::Company,
        owner_user_id: None,
        storage_location: Some("A1".to_string()),
        manufacturer: None,
        model: None,
        calibration_frequency_days: 365,
        custom_name: None,
    }
}

pub fn thread_spec(size: &str) -> Specification {
    Specification::Thread(ThreadSpecification {
        thread_size: ThreadSize::parse(size).unwrap(),
        thread_form: "UN".to_string(),
        thread_class: "2A".to_string(),
    })
}

/// Creates a spare thread gauge, returning its internal id.
pub async fn seed_spare(core: &GaugeLifecycleCore, serial: &str, size: &str) -> i64 {
    core.gauges()
        .create(&manager(), thread_draft(serial), thread_spec(size))
        .await
        .expect("seed spare")
        .gauge
        .id()
}

/// Pairs two freshly-seeded spares, returning (set_id, go_ref, nogo_ref).
pub async fn seed_set(
    core: &GaugeLifecycleCore,
    go_serial: &str,
    nogo_serial: &str,
    size: &str,
) -> (String, i64, i64) {
    let go = seed_spare(core, go_serial, size).await;
    let nogo = seed_spare(core, nogo_serial, size).await;
    let (set_id, _views) = core
        .pairing()
        .pair_spares(
            &manager(),
            go_serial,
            nogo_serial,
            gauge_lifecycle::application::services::SharedSetFields::default(),
        )
        .await
        .expect("pair spares");
    (set_id.as_str().to_string(), go, nogo)
}

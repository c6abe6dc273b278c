// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Checkout engine: paired cohorts, idempotent re-checkout, conflicts,
//! returns with QC routing, and transfers.

mod common;

use common::*;
use gauge_lifecycle::infrastructure::config::CoreSettings;
use gauge_lifecycle_domain::entities::{GaugeDraft, HandToolSpecification, Specification};
use gauge_lifecycle_domain::{
    EquipmentType, GaugeError, GaugeStatus, MeasurementUnit, OwnershipType,
};

#[tokio::test]
async fn test_paired_checkout_moves_both_members_atomically() {
    let core = test_core().await;
    let (_, go_ref, nogo_ref) = seed_set(&core, "G1", "G2", "1/4-20").await;

    let checkouts = core
        .checkouts()
        .checkout(&operator(), go_ref, Some("job X".to_string()))
        .await
        .unwrap();

    assert_eq!(checkouts.len(), 2);
    // One timestamp for the whole cohort.
    assert_eq!(checkouts[0].checked_out_at, checkouts[1].checked_out_at);
    assert!(checkouts.iter().all(|c| c.user_id == "u-operator"));

    for gauge_ref in [go_ref, nogo_ref] {
        let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
        assert_eq!(view.gauge.status(), GaugeStatus::CheckedOut);
    }

    // Each member gets a status-change and a checkout entry.
    for gauge_ref in [go_ref, nogo_ref] {
        let trail = core
            .audit()
            .query_by_entity(&manager(), "gauge", &gauge_ref.to_string(), 50)
            .await
            .unwrap();
        assert!(trail.iter().any(|e| e.action == "gauge.checked_out"));
        assert!(trail.iter().any(|e| e.action == "gauge.status_changed"));
    }
}

#[tokio::test]
async fn test_checkout_by_other_user_conflicts() {
    let core = test_core().await;
    let (_, go_ref, nogo_ref) = seed_set(&core, "G1", "G2", "1/4-20").await;

    core.checkouts()
        .checkout(&operator(), go_ref, Some("job X".to_string()))
        .await
        .unwrap();

    // A different user cannot take either member.
    let err = core
        .checkouts()
        .checkout(&second_operator(), nogo_ref, Some("job Y".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::AlreadyCheckedOut(_)));
}

#[tokio::test]
async fn test_re_checkout_same_user_same_notes_is_a_noop() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;

    let first = core
        .checkouts()
        .checkout(&operator(), gauge_ref, Some("job X".to_string()))
        .await
        .unwrap();
    let again = core
        .checkouts()
        .checkout(&operator(), gauge_ref, Some("job X".to_string()))
        .await
        .unwrap();
    assert_eq!(first[0].id, again[0].id);

    // Same user, different notes: still a conflict, not a second checkout.
    let err = core
        .checkouts()
        .checkout(&operator(), gauge_ref, Some("job Z".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::AlreadyCheckedOut(_)));
}

#[tokio::test]
async fn test_return_restores_cohort_and_clears_checkouts() {
    let core = test_core().await;
    let (_, go_ref, nogo_ref) = seed_set(&core, "G1", "G2", "1/4-20").await;

    core.checkouts()
        .checkout(&operator(), go_ref, None)
        .await
        .unwrap();
    core.checkouts()
        .return_gauge(&operator(), nogo_ref, Some("done".to_string()))
        .await
        .unwrap();

    for gauge_ref in [go_ref, nogo_ref] {
        let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
        assert_eq!(view.gauge.status(), GaugeStatus::Available);
        assert!(core
            .checkouts()
            .active_checkout(&manager(), gauge_ref)
            .await
            .unwrap()
            .is_none());
    }

    // Re-checkout after return succeeds.
    core.checkouts()
        .checkout(&operator(), go_ref, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_qc_policy_routes_return_to_pending_qc() {
    let mut settings = CoreSettings::default();
    settings.qc_on_return.insert(EquipmentType::HandTool);
    let core = test_core_with(settings).await;

    let view = core
        .gauges()
        .create(
            &manager(),
            GaugeDraft {
                gauge_id: Some("MIC-001".to_string()),
                serial_number: None,
                equipment_type: EquipmentType::HandTool,
                category: None,
                ownership: OwnershipType::Company,
                owner_user_id: None,
                storage_location: Some("B2".to_string()),
                manufacturer: None,
                model: None,
                calibration_frequency_days: 365,
                custom_name: None,
            },
            Specification::HandTool(HandToolSpecification {
                tool_format: "Micrometer".to_string(),
                range_min: 0.0,
                range_max: 1.0,
                unit: MeasurementUnit::Inch,
                resolution: None,
                accuracy: None,
            }),
        )
        .await
        .unwrap();
    let gauge_ref = view.gauge.id();

    core.checkouts()
        .checkout(&operator(), gauge_ref, None)
        .await
        .unwrap();
    core.checkouts()
        .return_gauge(&operator(), gauge_ref, None)
        .await
        .unwrap();

    let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
    assert_eq!(view.gauge.status(), GaugeStatus::PendingQc);

    // QC pass releases it.
    core.gauges().qc_pass(&operator(), gauge_ref).await.unwrap();
    let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
    assert_eq!(view.gauge.status(), GaugeStatus::Available);
}

#[tokio::test]
async fn test_employee_owned_gauge_blocks_other_users() {
    let core = test_core().await;
    let view = core
        .gauges()
        .create(
            &manager(),
            GaugeDraft {
                ownership: OwnershipType::Employee,
                owner_user_id: Some("u-operator".to_string()),
                ..thread_draft("PERSONAL")
            },
            thread_spec("1/4-20"),
        )
        .await
        .unwrap();
    let gauge_ref = view.gauge.id();

    let err = core
        .checkouts()
        .checkout(&second_operator(), gauge_ref, None)
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::PreconditionFailed(_)));

    // The owner may take it.
    core.checkouts()
        .checkout(&operator(), gauge_ref, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_transfer_moves_cohort_to_new_holder() {
    let core = test_core().await;
    let (_, go_ref, nogo_ref) = seed_set(&core, "G1", "G2", "1/4-20").await;

    core.checkouts()
        .checkout(&operator(), go_ref, None)
        .await
        .unwrap();
    core.checkouts()
        .transfer(&operator(), go_ref, "u-operator-2")
        .await
        .unwrap();

    for gauge_ref in [go_ref, nogo_ref] {
        let checkout = core
            .checkouts()
            .active_checkout(&manager(), gauge_ref)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(checkout.user_id, "u-operator-2");
    }

    let trail = core
        .audit()
        .query_by_entity(&manager(), "gauge", &go_ref.to_string(), 50)
        .await
        .unwrap();
    assert!(trail.iter().any(|e| e.action == "gauge.transferred"));
}

#[tokio::test]
async fn test_checkout_of_sidelined_gauge_is_illegal() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;
    core.gauges()
        .mark_out_of_service(&manager(), gauge_ref, Some("dropped".to_string()))
        .await
        .unwrap();

    let err = core
        .checkouts()
        .checkout(&operator(), gauge_ref, None)
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::IllegalTransition { .. }));
}

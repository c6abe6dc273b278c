// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Gauge intake, lookups, updates, serial uniqueness, and the
//! single-gauge lifecycle paths.

mod common;

use common::*;
use gauge_lifecycle::infrastructure::repositories::{GaugeFilter, GaugePatch, SpareFilter};
use gauge_lifecycle_domain::entities::{
    GaugeDraft, LargeEquipmentSpecification, Specification,
};
use gauge_lifecycle_domain::{
    EquipmentType, GaugeError, GaugeStatus, OwnershipType, ThreadSize,
};

#[tokio::test]
async fn test_intake_and_lookup_paths() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "abc123", "1/4-20").await;

    // Serials are canonically uppercased.
    let view = core
        .gauges()
        .get_by_serial(&manager(), EquipmentType::ThreadGauge, "abc123")
        .await
        .unwrap();
    assert_eq!(view.gauge.id(), gauge_ref);
    assert_eq!(view.gauge.serial_number().unwrap().as_str(), "ABC123");
    assert_eq!(view.display_name, "S/N ABC123");

    // Spare listing filters by canonical thread size.
    let spares = core
        .gauges()
        .list_spares(
            &manager(),
            SpareFilter {
                thread_size: Some(ThreadSize::parse(".250-20").unwrap()),
                ..SpareFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(spares.len(), 1);

    let none = core
        .gauges()
        .list_spares(
            &manager(),
            SpareFilter {
                thread_size: Some(ThreadSize::parse("5/16-18").unwrap()),
                ..SpareFilter::default()
            },
        )
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_serial_unique_among_non_retired() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "DUP-1", "1/4-20").await;

    let err = core
        .gauges()
        .create(&manager(), thread_draft("DUP-1"), thread_spec("1/4-20"))
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::Conflict(_)));

    // Retirement releases the serial for re-intake.
    core.gauges()
        .retire(&manager(), gauge_ref, Some("worn".to_string()))
        .await
        .unwrap();
    core.gauges()
        .create(&manager(), thread_draft("DUP-1"), thread_spec("1/4-20"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_public_id_lookup_returns_set_members_in_suffix_order() {
    let core = test_core().await;
    let (set_id, go_ref, nogo_ref) = seed_set(&core, "G1", "G2", "1/4-20").await;

    let views = core
        .gauges()
        .get_by_public_id(&manager(), &set_id)
        .await
        .unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].gauge.id(), go_ref, "A before B");
    assert_eq!(views[1].gauge.id(), nogo_ref);
}

#[tokio::test]
async fn test_update_patch_recomputes_display_name() {
    let core = test_core().await;
    let view = core
        .gauges()
        .create(
            &manager(),
            GaugeDraft {
                gauge_id: Some("CMM-01".to_string()),
                serial_number: None,
                equipment_type: EquipmentType::LargeEquipment,
                category: None,
                ownership: OwnershipType::Company,
                owner_user_id: None,
                storage_location: Some("FLOOR".to_string()),
                manufacturer: None,
                model: None,
                calibration_frequency_days: 180,
                custom_name: None,
            },
            Specification::LargeEquipment(LargeEquipmentSpecification {
                equipment_kind: "CMM".to_string(),
                capacity: Some("48x60".to_string()),
            }),
        )
        .await
        .unwrap();
    assert_eq!(view.display_name, "CMM (48x60)");

    let updated = core
        .gauges()
        .update(
            &manager(),
            view.gauge.id(),
            GaugePatch {
                custom_name: Some("Big CMM".to_string()),
                calibration_frequency_days: Some(90),
                ..GaugePatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name, "Big CMM");
    assert_eq!(updated.gauge.calibration_frequency_days(), 90);

    let trail = core
        .audit()
        .query_by_entity(&manager(), "gauge", &view.gauge.id().to_string(), 10)
        .await
        .unwrap();
    assert!(trail.iter().any(|e| e.action == "gauge.updated"));
}

#[tokio::test]
async fn test_list_filters() {
    let core = test_core().await;
    seed_spare(&core, "AAA-1", "1/4-20").await;
    let second = seed_spare(&core, "BBB-2", "1/4-20").await;
    core.gauges()
        .mark_out_of_service(&manager(), second, None)
        .await
        .unwrap();

    let available = core
        .gauges()
        .list(
            &manager(),
            GaugeFilter {
                status: Some(GaugeStatus::Available),
                ..GaugeFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(available.len(), 1);

    let by_search = core
        .gauges()
        .list(
            &manager(),
            GaugeFilter {
                search: Some("bbb".to_string()),
                ..GaugeFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].gauge.id(), second);
}

#[tokio::test]
async fn test_out_of_service_round_trip() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;

    core.gauges()
        .mark_out_of_service(&manager(), gauge_ref, Some("knocked off bench".to_string()))
        .await
        .unwrap();
    assert_eq!(
        core.gauges().get(&manager(), gauge_ref).await.unwrap().gauge.status(),
        GaugeStatus::OutOfService
    );

    core.gauges()
        .return_to_service(&manager(), gauge_ref)
        .await
        .unwrap();
    assert_eq!(
        core.gauges().get(&manager(), gauge_ref).await.unwrap().gauge.status(),
        GaugeStatus::Available
    );
}

#[tokio::test]
async fn test_retired_is_terminal() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;
    core.gauges().retire(&manager(), gauge_ref, None).await.unwrap();

    assert!(matches!(
        core.gauges()
            .return_to_service(&manager(), gauge_ref)
            .await
            .unwrap_err(),
        GaugeError::IllegalTransition { .. }
    ));
    assert!(matches!(
        core.checkouts()
            .checkout(&operator(), gauge_ref, None)
            .await
            .unwrap_err(),
        GaugeError::IllegalTransition { .. }
    ));
}

#[tokio::test]
async fn test_customer_return_path() {
    let core = test_core().await;
    let view = core
        .gauges()
        .create(
            &manager(),
            GaugeDraft {
                ownership: OwnershipType::Customer,
                ..thread_draft("CUST-1")
            },
            thread_spec("1/4-20"),
        )
        .await
        .unwrap();
    let gauge_ref = view.gauge.id();

    core.gauges().mark_returned(&manager(), gauge_ref).await.unwrap();
    let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
    assert_eq!(view.gauge.status(), GaugeStatus::Returned);

    // Returned customer property cannot be batched or checked out, only
    // re-accepted, sidelined, or retired.
    assert!(matches!(
        core.checkouts()
            .checkout(&operator(), gauge_ref, None)
            .await
            .unwrap_err(),
        GaugeError::IllegalTransition { .. }
    ));
    core.gauges()
        .return_to_service(&manager(), gauge_ref)
        .await
        .unwrap();
    assert_eq!(
        core.gauges().get(&manager(), gauge_ref).await.unwrap().gauge.status(),
        GaugeStatus::Available
    );

    // Company property cannot take the customer-return path.
    let company_ref = seed_spare(&core, "COMP-1", "1/4-20").await;
    assert!(matches!(
        core.gauges()
            .mark_returned(&manager(), company_ref)
            .await
            .unwrap_err(),
        GaugeError::PreconditionFailed(_)
    ));
}

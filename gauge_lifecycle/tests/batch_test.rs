// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The calibration batch workflow end to end, including the paired
//! certificate gate and location-verified release.

mod common;

use common::*;
use gauge_lifecycle_domain::entities::{BatchStatus, BatchType};
use gauge_lifecycle_domain::{GaugeError, GaugeStatus};

#[tokio::test]
async fn test_paired_batch_receive_certify_release() {
    let core = test_core().await;
    let (_, go_ref, nogo_ref) = seed_set(&core, "G1", "G2", "1/4-20").await;

    let batch = core
        .batches()
        .create(
            &manager(),
            BatchType::External,
            Some("MetroCal".to_string()),
            None,
        )
        .await
        .unwrap();
    assert_eq!(batch.status, BatchStatus::PendingSend);

    // Adding one member of a set pulls in the companion.
    core.batches()
        .add_gauge(&manager(), batch.id, go_ref)
        .await
        .unwrap();
    let (_, members) = core.batches().get(&manager(), batch.id).await.unwrap();
    assert_eq!(members.len(), 2);

    let sent = core.batches().send(&manager(), batch.id).await.unwrap();
    assert_eq!(sent.status, BatchStatus::Sent);
    assert!(sent.sent_at.is_some());
    for gauge_ref in [go_ref, nogo_ref] {
        let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
        assert_eq!(view.gauge.status(), GaugeStatus::OutForCalibration);
    }

    // First member comes back: sealed and parked, companion untouched.
    let after_first = core
        .batches()
        .receive_gauge(&manager(), batch.id, go_ref, true)
        .await
        .unwrap();
    assert_eq!(after_first.status, BatchStatus::PartiallyReceived);
    let go = core.gauges().get(&manager(), go_ref).await.unwrap();
    assert_eq!(go.gauge.status(), GaugeStatus::PendingCertificate);
    assert!(go.gauge.is_sealed());
    let nogo = core.gauges().get(&manager(), nogo_ref).await.unwrap();
    assert_eq!(nogo.gauge.status(), GaugeStatus::OutForCalibration);

    // Certified alone, the member still waits for its companion.
    core.certificates()
        .upload(&manager(), go_ref, "scans/go-cert.pdf", None)
        .await
        .unwrap();
    let err = core
        .batches()
        .verify_certificates(&manager(), go_ref)
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::AwaitingCompanionCertificate(_)));
    let go = core.gauges().get(&manager(), go_ref).await.unwrap();
    assert_eq!(go.gauge.status(), GaugeStatus::PendingCertificate);

    // Companion returns and is certified: both members move together.
    let after_second = core
        .batches()
        .receive_gauge(&manager(), batch.id, nogo_ref, true)
        .await
        .unwrap();
    assert_eq!(after_second.status, BatchStatus::Completed);
    core.certificates()
        .upload(&manager(), nogo_ref, "scans/nogo-cert.pdf", None)
        .await
        .unwrap();
    let moved = core
        .batches()
        .verify_certificates(&manager(), nogo_ref)
        .await
        .unwrap();
    assert_eq!(moved.len(), 2);
    for gauge_ref in [go_ref, nogo_ref] {
        let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
        assert_eq!(view.gauge.status(), GaugeStatus::PendingRelease);
    }

    // Release with a fresh location for the named gauge only; the
    // companion keeps its prior location.
    let released = core
        .batches()
        .release_gauge(&manager(), go_ref, Some("C7".to_string()), false)
        .await
        .unwrap();
    assert_eq!(released.len(), 2);
    let go = core.gauges().get(&manager(), go_ref).await.unwrap();
    let nogo = core.gauges().get(&manager(), nogo_ref).await.unwrap();
    assert_eq!(go.gauge.status(), GaugeStatus::Available);
    assert_eq!(nogo.gauge.status(), GaugeStatus::Available);
    assert_eq!(go.gauge.storage_location(), Some("C7"));
    assert_eq!(nogo.gauge.storage_location(), Some("A1"));
}

#[tokio::test]
async fn test_failed_calibration_retires_the_gauge() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;

    let batch = core
        .batches()
        .create(&manager(), BatchType::Internal, None, None)
        .await
        .unwrap();
    core.batches()
        .add_gauge(&manager(), batch.id, gauge_ref)
        .await
        .unwrap();
    core.batches().send(&manager(), batch.id).await.unwrap();

    let after = core
        .batches()
        .receive_gauge(&manager(), batch.id, gauge_ref, false)
        .await
        .unwrap();
    assert_eq!(after.status, BatchStatus::Completed);

    let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
    assert_eq!(view.gauge.status(), GaugeStatus::Retired);
    assert!(!view.gauge.is_sealed());

    let trail = core
        .audit()
        .query_by_entity(&manager(), "gauge", &gauge_ref.to_string(), 50)
        .await
        .unwrap();
    assert!(trail
        .iter()
        .any(|e| e.action == "gauge.retired"
            && e.after.as_ref().is_some_and(|a| a["reason"] == "calibration_failed")));
}

#[tokio::test]
async fn test_checked_out_gauge_cannot_join_a_batch() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;
    core.checkouts()
        .checkout(&operator(), gauge_ref, None)
        .await
        .unwrap();

    let batch = core
        .batches()
        .create(&manager(), BatchType::Internal, None, None)
        .await
        .unwrap();
    let err = core
        .batches()
        .add_gauge(&manager(), batch.id, gauge_ref)
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::PreconditionFailed(_)));
}

#[tokio::test]
async fn test_gauge_cannot_be_in_two_open_batches() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;

    let first = core
        .batches()
        .create(&manager(), BatchType::Internal, None, None)
        .await
        .unwrap();
    core.batches()
        .add_gauge(&manager(), first.id, gauge_ref)
        .await
        .unwrap();

    let second = core
        .batches()
        .create(&manager(), BatchType::Internal, None, None)
        .await
        .unwrap();
    let err = core
        .batches()
        .add_gauge(&manager(), second.id, gauge_ref)
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::PreconditionFailed(_)));

    // Cancelling the first frees the gauge.
    core.batches().cancel(&manager(), first.id).await.unwrap();
    core.batches()
        .add_gauge(&manager(), second.id, gauge_ref)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_external_batch_requires_vendor() {
    let core = test_core().await;
    let err = core
        .batches()
        .create(&manager(), BatchType::External, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::ValidationError(_)));
}

#[tokio::test]
async fn test_empty_or_sent_batches_cannot_be_sent_or_cancelled() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;

    let batch = core
        .batches()
        .create(&manager(), BatchType::Internal, None, None)
        .await
        .unwrap();

    // Empty send rejected.
    let err = core.batches().send(&manager(), batch.id).await.unwrap_err();
    assert!(matches!(err, GaugeError::PreconditionFailed(_)));

    core.batches()
        .add_gauge(&manager(), batch.id, gauge_ref)
        .await
        .unwrap();
    core.batches().send(&manager(), batch.id).await.unwrap();

    // Sent batches cannot be cancelled or re-sent, and membership is frozen.
    assert!(matches!(
        core.batches().cancel(&manager(), batch.id).await.unwrap_err(),
        GaugeError::PreconditionFailed(_)
    ));
    assert!(matches!(
        core.batches().send(&manager(), batch.id).await.unwrap_err(),
        GaugeError::PreconditionFailed(_)
    ));
    assert!(matches!(
        core.batches()
            .remove_gauge(&manager(), batch.id, gauge_ref)
            .await
            .unwrap_err(),
        GaugeError::PreconditionFailed(_)
    ));
}

#[tokio::test]
async fn test_unpaired_gauge_verifies_and_releases_alone() {
    let core = test_core().await;
    let gauge_ref = seed_spare(&core, "SOLO", "1/4-20").await;

    let batch = core
        .batches()
        .create(&manager(), BatchType::Internal, None, None)
        .await
        .unwrap();
    core.batches()
        .add_gauge(&manager(), batch.id, gauge_ref)
        .await
        .unwrap();
    core.batches().send(&manager(), batch.id).await.unwrap();
    core.batches()
        .receive_gauge(&manager(), batch.id, gauge_ref, true)
        .await
        .unwrap();

    // No certificate yet: verification refuses.
    let err = core
        .batches()
        .verify_certificates(&manager(), gauge_ref)
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::PreconditionFailed(_)));

    core.certificates()
        .upload(&manager(), gauge_ref, "scans/cert.pdf", None)
        .await
        .unwrap();
    let moved = core
        .batches()
        .verify_certificates(&manager(), gauge_ref)
        .await
        .unwrap();
    assert_eq!(moved, vec![gauge_ref]);

    core.batches()
        .release_gauge(&manager(), gauge_ref, None, false)
        .await
        .unwrap();
    let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
    assert_eq!(view.gauge.status(), GaugeStatus::Available);
    // Seeded location retained.
    assert_eq!(view.gauge.storage_location(), Some("A1"));
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Pairing lifecycle: set creation, id allocation and burn-forever rules,
//! member replacement, unpairing, and whole-set retirement.

mod common;

use common::*;
use gauge_lifecycle::application::services::SharedSetFields;
use gauge_lifecycle_domain::{GaugeError, GaugeStatus, GaugeSuffix};

#[tokio::test]
async fn test_pairing_two_spares_builds_a_bidirectional_set() {
    let core = test_core().await;
    let go_ref = seed_spare(&core, "ABC123", "1/4-20").await;
    let nogo_ref = seed_spare(&core, "DEF456", "1/4-20").await;

    let (set_id, views) = core
        .pairing()
        .pair_spares(
            &manager(),
            "ABC123",
            "DEF456",
            SharedSetFields {
                manufacturer: Some("Acme".to_string()),
                ..SharedSetFields::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(set_id.as_str(), "SP0001");

    let go = views.iter().find(|v| v.gauge.id() == go_ref).unwrap();
    let nogo = views.iter().find(|v| v.gauge.id() == nogo_ref).unwrap();

    // The first serial in the call becomes the GO member.
    assert_eq!(go.gauge.suffix(), Some(GaugeSuffix::A));
    assert_eq!(nogo.gauge.suffix(), Some(GaugeSuffix::B));
    assert_eq!(go.gauge.gauge_id(), Some("SP0001"));
    assert_eq!(nogo.gauge.gauge_id(), Some("SP0001"));
    assert_eq!(go.gauge.companion_id(), Some(nogo_ref));
    assert_eq!(nogo.gauge.companion_id(), Some(go_ref));
    assert_eq!(go.gauge.public_label().unwrap(), "SP0001A");
    assert_eq!(go.gauge.manufacturer(), Some("Acme"));
    assert_eq!(nogo.gauge.manufacturer(), Some("Acme"));
    assert_eq!(go.display_name, ".250-20 UN 2A Thread GO Gauge");
    assert_eq!(nogo.display_name, ".250-20 UN 2A Thread NO GO Gauge");

    // One set_created entry plus one update per member.
    let set_trail = core
        .audit()
        .query_by_entity(&manager(), "set", "SP0001", 10)
        .await
        .unwrap();
    assert_eq!(set_trail.len(), 1);
    assert_eq!(set_trail[0].action, "set.created");

    let history = core
        .pairing()
        .set_history(&manager(), "SP0001")
        .await
        .unwrap();
    assert!(history.record.is_some());
    assert!(history.record.unwrap().retired_at.is_none());
}

#[tokio::test]
async fn test_burned_set_id_is_skipped_by_the_allocator() {
    let core = test_core().await;
    let (set_id, _, _) = seed_set(&core, "G1", "G2", "1/4-20").await;
    assert_eq!(set_id, "SP0001");

    core.pairing().unpair(&manager(), "SP0001").await.unwrap();

    // Fresh spares, same spec. The allocator proposes SP0001 again (no
    // gauge wears an id now) but history burns it.
    seed_spare(&core, "G3", "1/4-20").await;
    seed_spare(&core, "G4", "1/4-20").await;
    let (next_id, _) = core
        .pairing()
        .pair_spares(&manager(), "G3", "G4", SharedSetFields::default())
        .await
        .unwrap();
    assert_eq!(next_id.as_str(), "SP0002");
}

#[tokio::test]
async fn test_caller_specified_burned_id_is_rejected() {
    let core = test_core().await;
    let (set_id, _, _) = seed_set(&core, "G1", "G2", "1/4-20").await;
    core.pairing().unpair(&manager(), &set_id).await.unwrap();

    seed_spare(&core, "G3", "1/4-20").await;
    seed_spare(&core, "G4", "1/4-20").await;
    let err = core
        .pairing()
        .pair_spares(
            &manager(),
            "G3",
            "G4",
            SharedSetFields {
                requested_set_id: Some(set_id.clone()),
                ..SharedSetFields::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::SetIdReused(id) if id == set_id));
}

#[tokio::test]
async fn test_unpair_restores_spares_but_keeps_history() {
    let core = test_core().await;
    let (set_id, go_ref, nogo_ref) = seed_set(&core, "G1", "G2", "1/4-20").await;

    core.pairing().unpair(&manager(), &set_id).await.unwrap();

    for gauge_ref in [go_ref, nogo_ref] {
        let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
        assert!(view.gauge.is_spare());
        assert_eq!(view.gauge.status(), GaugeStatus::Available);
        assert_eq!(view.gauge.companion_id(), None);
        assert_eq!(view.gauge.suffix(), None);
        // Spares fall back to serial-number naming.
        assert!(view.display_name.starts_with("S/N "));
    }

    // The ledger row survives unretired: the id stays burned.
    let history = core
        .pairing()
        .set_history(&manager(), &set_id)
        .await
        .unwrap();
    let record = history.record.unwrap();
    assert!(record.retired_at.is_none());
}

#[tokio::test]
async fn test_replace_member_preserves_set_id_and_partner() {
    let core = test_core().await;
    let (set_id, go_ref, nogo_ref) = seed_set(&core, "OLD-GO", "KEEP-NOGO", "1/4-20").await;
    let spare_ref = seed_spare(&core, "NEW-GO", "1/4-20").await;

    let views = core
        .pairing()
        .replace_member(&manager(), &set_id, "OLD-GO", "NEW-GO")
        .await
        .unwrap();

    let old = views.iter().find(|v| v.gauge.id() == go_ref).unwrap();
    let incoming = views.iter().find(|v| v.gauge.id() == spare_ref).unwrap();
    let partner = views.iter().find(|v| v.gauge.id() == nogo_ref).unwrap();

    assert!(old.gauge.is_spare());
    assert_eq!(old.gauge.status(), GaugeStatus::Available);

    assert_eq!(incoming.gauge.gauge_id(), Some(set_id.as_str()));
    assert_eq!(incoming.gauge.suffix(), Some(GaugeSuffix::A));
    assert_eq!(incoming.gauge.companion_id(), Some(nogo_ref));
    assert_eq!(partner.gauge.companion_id(), Some(spare_ref));
}

#[tokio::test]
async fn test_replace_member_requires_matching_specification() {
    let core = test_core().await;
    let (set_id, _, _) = seed_set(&core, "G1", "G2", "1/4-20").await;
    seed_spare(&core, "WRONG", "5/16-18").await;

    let err = core
        .pairing()
        .replace_member(&manager(), &set_id, "G1", "WRONG")
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::PreconditionFailed(_)));
}

#[tokio::test]
async fn test_retire_set_keeps_pairing_and_stamps_history() {
    let core = test_core().await;
    let (set_id, go_ref, nogo_ref) = seed_set(&core, "G1", "G2", "1/4-20").await;

    core.pairing().retire_set(&manager(), &set_id).await.unwrap();

    for gauge_ref in [go_ref, nogo_ref] {
        let view = core.gauges().get(&manager(), gauge_ref).await.unwrap();
        assert_eq!(view.gauge.status(), GaugeStatus::Retired);
        // Retired members stay paired for historical clarity.
        assert_eq!(view.gauge.gauge_id(), Some(set_id.as_str()));
        assert!(view.gauge.companion_id().is_some());
    }

    let record = core
        .pairing()
        .set_history(&manager(), &set_id)
        .await
        .unwrap()
        .record
        .unwrap();
    assert!(record.retired_at.is_some());
}

#[tokio::test]
async fn test_pairing_rejects_non_spares_and_mismatches() {
    let core = test_core().await;
    seed_spare(&core, "G1", "1/4-20").await;
    seed_spare(&core, "G2", "5/16-18").await;

    // Specification mismatch.
    let err = core
        .pairing()
        .pair_spares(&manager(), "G1", "G2", SharedSetFields::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::PreconditionFailed(_)));

    // A paired member is no longer a spare.
    seed_spare(&core, "G3", "1/4-20").await;
    core.pairing()
        .pair_spares(&manager(), "G1", "G3", SharedSetFields::default())
        .await
        .unwrap();
    seed_spare(&core, "G4", "1/4-20").await;
    let err = core
        .pairing()
        .pair_spares(&manager(), "G1", "G4", SharedSetFields::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GaugeError::PreconditionFailed(_)));
}

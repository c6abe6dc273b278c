// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Certificate Registry
//!
//! The per-gauge chain of calibration certificates. An upload supersedes
//! every prior current certificate in the same transaction, rolls the
//! calibration schedule forward, and leaves exactly one current member in
//! the chain. Deleting the current certificate does NOT promote a
//! superseded one; the gauge may need re-verification, and that call is
//! the workflow's to make.
//!
//! Display names: a custom name wins; otherwise the default
//! `{extension}_Certificate_{YYYY.MM.DD}` with `_2`, `_3`, … suffixes for
//! collisions within the gauge's chain, assigned in upload order.

use chrono::Utc;
use serde_json::json;

use gauge_lifecycle_domain::entities::{CalibrationSchedule, Certificate};
use gauge_lifecycle_domain::{
    AssetCalibrationChangedEvent, AuditSeverity, Caller, Capability, CertificateSupersededEvent,
    CertificateUploadedEvent, EventMeta, GaugeError, GaugeEvent,
};

use crate::infrastructure::audit::AuditLog;
use crate::infrastructure::repositories::{CertificateStore, GaugeStore};

use super::context::GaugeLifecycleCore;

/// A certificate with its resolved (collision-free) display name.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CertificateView {
    pub certificate: Certificate,
    pub display_name: String,
}

pub struct CertificateService<'a> {
    core: &'a GaugeLifecycleCore,
}

impl<'a> CertificateService<'a> {
    pub(crate) fn new(core: &'a GaugeLifecycleCore) -> Self {
        Self { core }
    }

    /// Records an uploaded certificate (the file itself lives in external
    /// blob storage; only the reference crosses this boundary).
    pub async fn upload(
        &self,
        caller: &Caller,
        gauge_ref: i64,
        file_ref: &str,
        custom_name: Option<String>,
    ) -> Result<Certificate, GaugeError> {
        self.core
            .authorize(caller, Capability::CalibrationManage, "gauge", &gauge_ref.to_string())
            .await?;
        if file_ref.trim().is_empty() {
            return Err(GaugeError::validation_error(
                "Certificate file reference cannot be empty",
            ));
        }

        let file_ref = file_ref.to_string();
        let (certificate, events) = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                let file_ref = file_ref.clone();
                let custom_name = custom_name.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let gauge = GaugeStore::find_by_id(conn, gauge_ref).await?;

                    let previous_current = CertificateStore::current_for(conn, gauge_ref).await?;
                    let new_id = CertificateStore::insert(
                        conn,
                        gauge_ref,
                        &file_ref,
                        caller.user_id(),
                        custom_name.as_deref(),
                        now,
                    )
                    .await?;

                    let mut events = vec![GaugeEvent::CertificateUploaded(
                        CertificateUploadedEvent {
                            meta: EventMeta::now(),
                            certificate_id: new_id,
                            gauge_ref,
                        },
                    )];

                    for old in &previous_current {
                        CertificateStore::supersede(conn, old.id, new_id, now).await?;
                        AuditLog::append(
                            conn,
                            caller.user_id(),
                            "certificate.superseded",
                            "certificate",
                            &old.id.to_string(),
                            Some(json!({ "is_current": true })),
                            Some(json!({ "is_current": false, "superseded_by": new_id })),
                            AuditSeverity::Info,
                        )
                        .await?;
                        events.push(GaugeEvent::CertificateSuperseded(
                            CertificateSupersededEvent {
                                meta: EventMeta::now(),
                                superseded_id: old.id,
                                superseded_by: new_id,
                                gauge_ref,
                            },
                        ));
                    }

                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "certificate.uploaded",
                        "certificate",
                        &new_id.to_string(),
                        None,
                        Some(json!({ "gauge_ref": gauge_ref, "file_ref": file_ref })),
                        AuditSeverity::Info,
                    )
                    .await?;

                    // The upload is the completion evidence for the gauge's
                    // calibration cycle.
                    let mut schedule = GaugeStore::schedule(conn, gauge_ref)
                        .await?
                        .unwrap_or_else(|| {
                            CalibrationSchedule::new(gauge_ref, gauge.calibration_frequency_days())
                        });
                    schedule.roll_forward(now);
                    GaugeStore::save_schedule(conn, &schedule).await?;
                    events.push(GaugeEvent::AssetCalibrationChanged(
                        AssetCalibrationChangedEvent {
                            meta: EventMeta::now(),
                            gauge_ref,
                            next_due_at: schedule.next_due_at,
                        },
                    ));

                    let certificate = CertificateStore::find_by_id(conn, new_id).await?;
                    Ok((certificate, events))
                })
            })
            .await?;

        self.core.event_bus().publish_all(&events);
        Ok(certificate)
    }

    /// The gauge's chain in upload order with collision-free display
    /// names; the single current certificate is flagged on the entity.
    pub async fn list(
        &self,
        caller: &Caller,
        gauge_ref: i64,
    ) -> Result<Vec<CertificateView>, GaugeError> {
        self.core
            .authorize(caller, Capability::GaugeView, "gauge", &gauge_ref.to_string())
            .await?;

        let chain = self
            .core
            .run_txn(caller.user_id(), "gauge", &gauge_ref.to_string(), |conn| {
                Box::pin(async move { CertificateStore::list_chain(conn, gauge_ref).await })
            })
            .await?;

        Ok(resolve_display_names(chain))
    }

    /// Metadata-only rename.
    pub async fn rename(
        &self,
        caller: &Caller,
        certificate_id: i64,
        custom_name: &str,
    ) -> Result<(), GaugeError> {
        self.core
            .authorize(
                caller,
                Capability::CalibrationManage,
                "certificate",
                &certificate_id.to_string(),
            )
            .await?;
        if custom_name.trim().is_empty() {
            return Err(GaugeError::validation_error(
                "Certificate name cannot be empty",
            ));
        }

        let custom_name = custom_name.trim().to_string();
        self.core
            .run_txn(caller.user_id(), "certificate", &certificate_id.to_string(), |conn| {
                let custom_name = custom_name.clone();
                let caller = caller.clone();
                Box::pin(async move {
                    let before = CertificateStore::find_by_id(conn, certificate_id).await?;
                    CertificateStore::rename(conn, certificate_id, &custom_name).await?;
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "certificate.renamed",
                        "certificate",
                        &certificate_id.to_string(),
                        Some(json!({ "custom_name": before.custom_name })),
                        Some(json!({ "custom_name": custom_name })),
                        AuditSeverity::Info,
                    )
                    .await?;
                    Ok(())
                })
            })
            .await
    }

    /// Soft delete. Deleting the current certificate is audited at
    /// warning severity because the gauge loses its calibration evidence
    /// without a replacement being promoted.
    pub async fn soft_delete(
        &self,
        caller: &Caller,
        certificate_id: i64,
    ) -> Result<(), GaugeError> {
        self.core
            .authorize(
                caller,
                Capability::CalibrationManage,
                "certificate",
                &certificate_id.to_string(),
            )
            .await?;

        self.core
            .run_txn(caller.user_id(), "certificate", &certificate_id.to_string(), |conn| {
                let caller = caller.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let before = CertificateStore::find_by_id(conn, certificate_id).await?;
                    CertificateStore::soft_delete(conn, certificate_id, now).await?;
                    let severity = if before.is_current {
                        AuditSeverity::Warning
                    } else {
                        AuditSeverity::Info
                    };
                    AuditLog::append(
                        conn,
                        caller.user_id(),
                        "certificate.deleted",
                        "certificate",
                        &certificate_id.to_string(),
                        Some(json!({ "is_current": before.is_current })),
                        Some(json!({ "deleted": true })),
                        severity,
                    )
                    .await?;
                    Ok(())
                })
            })
            .await
    }
}

/// Applies the default-name collision policy over a chain in upload order.
fn resolve_display_names(chain: Vec<Certificate>) -> Vec<CertificateView> {
    let mut seen: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    chain
        .into_iter()
        .map(|certificate| {
            let base = certificate.display_name();
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let display_name = if *count == 1 {
                base
            } else {
                format!("{}_{}", base, count)
            };
            CertificateView {
                certificate,
                display_name,
            }
        })
        .collect()
}

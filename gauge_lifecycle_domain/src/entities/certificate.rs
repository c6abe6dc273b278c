// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Certificate Entity
//!
//! One calibration event on record. The engine stores metadata and an
//! opaque reference to the externally-stored file; the chain of
//! certificates per gauge has at most one current member, and superseded
//! members link forward to their replacement. Certificates are soft-deleted
//! only, preserving the chain for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::GaugeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: i64,
    pub gauge_ref: i64,
    pub file_ref: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
    pub custom_name: Option<String>,
    pub is_current: bool,
    pub superseded_at: Option<DateTime<Utc>>,
    pub superseded_by: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Superseded-state consistency: a superseded certificate carries both
    /// the timestamp and the forward link; a current one carries neither.
    pub fn validate(&self) -> Result<(), GaugeError> {
        if self.is_current && (self.superseded_at.is_some() || self.superseded_by.is_some()) {
            return Err(GaugeError::invariant_violation(format!(
                "Certificate {} is current but carries supersession fields",
                self.id
            )));
        }
        if !self.is_current
            && self.deleted_at.is_none()
            && self.superseded_at.is_some() != self.superseded_by.is_some()
        {
            return Err(GaugeError::invariant_violation(format!(
                "Certificate {} has a partial supersession record",
                self.id
            )));
        }
        Ok(())
    }

    /// Display name: the custom name when set, otherwise
    /// `{extension}_Certificate_{YYYY.MM.DD}` derived from the file
    /// reference and upload date. Collision suffixes are applied by the
    /// registry, which sees the sibling names.
    pub fn display_name(&self) -> String {
        match &self.custom_name {
            Some(name) => name.clone(),
            None => Self::default_display_name(&self.file_ref, self.uploaded_at),
        }
    }

    /// The un-disambiguated default display name.
    pub fn default_display_name(file_ref: &str, uploaded_at: DateTime<Utc>) -> String {
        let extension = file_ref
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("file");
        format!(
            "{}_Certificate_{}",
            extension,
            uploaded_at.format("%Y.%m.%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cert(id: i64) -> Certificate {
        Certificate {
            id,
            gauge_ref: 1,
            file_ref: "blobs/2026/cal-report.pdf".to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
            uploaded_by: "u-inspector".to_string(),
            custom_name: None,
            is_current: true,
            superseded_at: None,
            superseded_by: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_default_display_name() {
        assert_eq!(cert(1).display_name(), "pdf_Certificate_2026.03.14");
    }

    #[test]
    fn test_custom_name_wins() {
        let mut c = cert(1);
        c.custom_name = Some("Annual cal".to_string());
        assert_eq!(c.display_name(), "Annual cal");
    }

    #[test]
    fn test_missing_extension_falls_back() {
        assert_eq!(
            Certificate::default_display_name("no-extension", Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap()),
            "file_Certificate_2026.01.02"
        );
    }

    #[test]
    fn test_current_with_supersession_fields_is_invalid() {
        let mut c = cert(1);
        c.superseded_by = Some(2);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_partial_supersession_is_invalid() {
        let mut c = cert(1);
        c.is_current = false;
        c.superseded_at = Some(Utc::now());
        assert!(c.validate().is_err());

        c.superseded_by = Some(2);
        assert!(c.validate().is_ok());
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Store
//!
//! CRUD for gauges and their specifications with strongly-typed reads.
//! Raw rows never leave this module: every read path funnels through one
//! mapping function that parses status/enum columns and converts SQLite's
//! 0/1 integer flags to booleans, so callers always receive the canonical
//! [`Gauge`] entity.
//!
//! Display names are derived, never stored: [`GaugeStore::view`] computes
//! them from the current specification on every read, so specification
//! edits are reflected immediately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use gauge_lifecycle_domain::entities::{
    CalibrationSchedule, CalibrationStandardSpecification, Gauge, GaugeData, GaugeDraft,
    HandToolSpecification, LargeEquipmentSpecification, Specification, ThreadSpecification,
};
use gauge_lifecycle_domain::services::display_name;
use gauge_lifecycle_domain::{
    EquipmentType, GaugeError, GaugeStatus, GaugeSuffix, MeasurementUnit, OwnershipType,
    SerialNumber, ThreadSize,
};

use crate::infrastructure::txn::classify_sqlx_error;

const GAUGE_COLUMNS: &str = "id, gauge_id, serial_number, equipment_type, category, ownership, \
     owner_user_id, status, is_sealed, unseal_pending, storage_location, manufacturer, model, \
     calibration_frequency_days, gauge_suffix, companion_id, custom_name, created_at, updated_at";

/// A gauge together with its specification and derived display name.
#[derive(Debug, Clone, Serialize)]
pub struct GaugeView {
    pub gauge: Gauge,
    pub specification: Option<Specification>,
    pub display_name: String,
}

/// Listing filter; all fields are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct GaugeFilter {
    pub equipment_type: Option<EquipmentType>,
    pub status: Option<GaugeStatus>,
    pub ownership: Option<OwnershipType>,
    pub storage_location: Option<String>,
    /// Substring match over serial number, public id, manufacturer, model.
    pub search: Option<String>,
}

/// Filter for spare thread gauges (unpaired, available).
#[derive(Debug, Clone, Default)]
pub struct SpareFilter {
    pub thread_size: Option<ThreadSize>,
    pub thread_form: Option<String>,
    pub thread_class: Option<String>,
}

/// Field patch for gauge updates; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct GaugePatch {
    pub category: Option<String>,
    pub storage_location: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub custom_name: Option<String>,
    pub calibration_frequency_days: Option<i64>,
}

impl GaugePatch {
    /// Names of the fields the patch touches, for audit payloads.
    pub fn changed_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.category.is_some() {
            fields.push("category".to_string());
        }
        if self.storage_location.is_some() {
            fields.push("storage_location".to_string());
        }
        if self.manufacturer.is_some() {
            fields.push("manufacturer".to_string());
        }
        if self.model.is_some() {
            fields.push("model".to_string());
        }
        if self.custom_name.is_some() {
            fields.push("custom_name".to_string());
        }
        if self.calibration_frequency_days.is_some() {
            fields.push("calibration_frequency_days".to_string());
        }
        fields
    }
}

pub struct GaugeStore;

impl GaugeStore {
    /// Creates a gauge with its specification and an empty calibration
    /// schedule, returning the hydrated entity.
    pub async fn create(
        conn: &mut SqliteConnection,
        draft: &GaugeDraft,
        spec: &Specification,
        now: DateTime<Utc>,
    ) -> Result<Gauge, GaugeError> {
        draft.validate()?;
        spec.validate_for(draft.equipment_type)?;

        if let Some(serial) = &draft.serial_number {
            if Self::serial_in_use(conn, draft.equipment_type, serial, None).await? {
                return Err(GaugeError::conflict(format!(
                    "Serial {} already in use for {}",
                    serial, draft.equipment_type
                )));
            }
        }

        let result = sqlx::query(
            "INSERT INTO gauges (gauge_id, serial_number, equipment_type, category, ownership, \
             owner_user_id, status, is_sealed, unseal_pending, storage_location, manufacturer, \
             model, calibration_frequency_days, gauge_suffix, companion_id, custom_name, \
             created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?, ?, ?, NULL, NULL, ?, ?, ?)",
        )
        .bind(&draft.gauge_id)
        .bind(draft.serial_number.as_ref().map(|s| s.as_str()))
        .bind(draft.equipment_type.as_str())
        .bind(&draft.category)
        .bind(draft.ownership.as_str())
        .bind(&draft.owner_user_id)
        .bind(GaugeStatus::Available.as_str())
        .bind(&draft.storage_location)
        .bind(&draft.manufacturer)
        .bind(&draft.model)
        .bind(draft.calibration_frequency_days)
        .bind(&draft.custom_name)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        let id = result.last_insert_rowid();
        Self::insert_specification(conn, id, spec).await?;

        sqlx::query(
            "INSERT INTO calibration_schedules (gauge_ref, frequency_days) VALUES (?, ?)",
        )
        .bind(id)
        .bind(draft.calibration_frequency_days)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        debug!(gauge = id, equipment_type = %draft.equipment_type, "gauge created");
        Self::find_by_id(conn, id).await
    }

    /// Fetches a gauge by internal id.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Gauge, GaugeError> {
        Self::try_find_by_id(conn, id)
            .await?
            .ok_or_else(|| GaugeError::not_found(format!("Gauge {}", id)))
    }

    pub async fn try_find_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Gauge>, GaugeError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM gauges WHERE id = ?",
            GAUGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(|r| map_gauge_row(&r)).transpose()
    }

    /// Serial lookup, the identity path for thread-gauge spares.
    pub async fn find_by_serial(
        conn: &mut SqliteConnection,
        equipment_type: EquipmentType,
        serial: &SerialNumber,
    ) -> Result<Gauge, GaugeError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM gauges \
             WHERE equipment_type = ? AND serial_number = ? AND status != 'retired'",
            GAUGE_COLUMNS
        ))
        .bind(equipment_type.as_str())
        .bind(serial.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(|r| map_gauge_row(&r))
            .transpose()?
            .ok_or_else(|| {
                GaugeError::not_found(format!("{} with serial {}", equipment_type, serial))
            })
    }

    /// Public-id lookup: one row for plain gauges, the A and B members in
    /// suffix order for a thread set.
    pub async fn find_by_public_id(
        conn: &mut SqliteConnection,
        public_id: &str,
    ) -> Result<Vec<Gauge>, GaugeError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM gauges WHERE gauge_id = ? ORDER BY gauge_suffix",
            GAUGE_COLUMNS
        ))
        .bind(public_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        rows.iter().map(map_gauge_row).collect()
    }

    /// Spares: unpaired, available thread gauges, optionally filtered by
    /// thread specification.
    pub async fn find_spare_thread_gauges(
        conn: &mut SqliteConnection,
        filter: &SpareFilter,
    ) -> Result<Vec<Gauge>, GaugeError> {
        let mut sql = format!(
            "SELECT {} FROM gauges g \
             JOIN thread_specifications t ON t.gauge_ref = g.id \
             WHERE g.equipment_type = 'thread_gauge' AND g.gauge_id IS NULL \
             AND g.status = 'available'",
            gauge_columns_qualified("g")
        );
        if filter.thread_size.is_some() {
            sql.push_str(" AND t.thread_size = ?");
        }
        if filter.thread_form.is_some() {
            sql.push_str(" AND t.thread_form = ? COLLATE NOCASE");
        }
        if filter.thread_class.is_some() {
            sql.push_str(" AND t.thread_class = ? COLLATE NOCASE");
        }
        sql.push_str(" ORDER BY g.serial_number");

        let mut query = sqlx::query(&sql);
        if let Some(size) = &filter.thread_size {
            query = query.bind(size.as_str().to_string());
        }
        if let Some(form) = &filter.thread_form {
            query = query.bind(form.clone());
        }
        if let Some(class) = &filter.thread_class {
            query = query.bind(class.clone());
        }

        let rows = query
            .fetch_all(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        rows.iter().map(map_gauge_row).collect()
    }

    /// Filtered listing over all gauges.
    pub async fn list(
        conn: &mut SqliteConnection,
        filter: &GaugeFilter,
    ) -> Result<Vec<Gauge>, GaugeError> {
        let mut sql = format!("SELECT {} FROM gauges WHERE 1 = 1", GAUGE_COLUMNS);
        if filter.equipment_type.is_some() {
            sql.push_str(" AND equipment_type = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.ownership.is_some() {
            sql.push_str(" AND ownership = ?");
        }
        if filter.storage_location.is_some() {
            sql.push_str(" AND storage_location = ?");
        }
        if filter.search.is_some() {
            sql.push_str(
                " AND (serial_number LIKE ? OR gauge_id LIKE ? \
                 OR manufacturer LIKE ? OR model LIKE ?)",
            );
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query(&sql);
        if let Some(et) = filter.equipment_type {
            query = query.bind(et.as_str());
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        if let Some(ownership) = filter.ownership {
            query = query.bind(ownership.as_str());
        }
        if let Some(location) = &filter.storage_location {
            query = query.bind(location.clone());
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.to_uppercase());
            query = query
                .bind(pattern.clone())
                .bind(pattern.clone())
                .bind(pattern.clone())
                .bind(pattern);
        }

        let rows = query
            .fetch_all(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        rows.iter().map(map_gauge_row).collect()
    }

    /// Highest numeric tail among set ids currently worn by thread
    /// gauges with the given prefix; the set-id allocator proposes one
    /// past this.
    pub async fn highest_set_counter(
        conn: &mut SqliteConnection,
        prefix: &str,
    ) -> Result<Option<u64>, GaugeError> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT gauge_id FROM gauges \
             WHERE equipment_type = 'thread_gauge' AND gauge_id LIKE ?",
        )
        .bind(format!("{}%", prefix))
        .fetch_all(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        Ok(ids
            .iter()
            .filter_map(|id| gauge_lifecycle_domain::SetId::new(id).ok())
            .map(|id| id.counter())
            .max())
    }

    /// Whether a serial is taken among non-retired gauges of a type.
    pub async fn serial_in_use(
        conn: &mut SqliteConnection,
        equipment_type: EquipmentType,
        serial: &SerialNumber,
        exclude_id: Option<i64>,
    ) -> Result<bool, GaugeError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM gauges \
             WHERE equipment_type = ? AND serial_number = ? AND status != 'retired' \
             AND id != ?",
        )
        .bind(equipment_type.as_str())
        .bind(serial.as_str())
        .bind(exclude_id.unwrap_or(-1))
        .fetch_one(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        Ok(count > 0)
    }

    /// Applies a field patch, merging unchanged fields from the current row.
    pub async fn update_fields(
        conn: &mut SqliteConnection,
        id: i64,
        patch: &GaugePatch,
        now: DateTime<Utc>,
    ) -> Result<Gauge, GaugeError> {
        let current = Self::find_by_id(conn, id).await?;

        let category = patch.category.clone().or_else(|| current.category().map(String::from));
        let storage = patch
            .storage_location
            .clone()
            .or_else(|| current.storage_location().map(String::from));
        let manufacturer = patch
            .manufacturer
            .clone()
            .or_else(|| current.manufacturer().map(String::from));
        let model = patch.model.clone().or_else(|| current.model().map(String::from));
        let custom_name = patch
            .custom_name
            .clone()
            .or_else(|| current.custom_name().map(String::from));
        let frequency = patch
            .calibration_frequency_days
            .unwrap_or_else(|| current.calibration_frequency_days());

        sqlx::query(
            "UPDATE gauges SET category = ?, storage_location = ?, manufacturer = ?, model = ?, \
             custom_name = ?, calibration_frequency_days = ?, updated_at = ? WHERE id = ?",
        )
        .bind(category)
        .bind(storage)
        .bind(manufacturer)
        .bind(model)
        .bind(custom_name)
        .bind(frequency)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        if patch.calibration_frequency_days.is_some() {
            sqlx::query("UPDATE calibration_schedules SET frequency_days = ? WHERE gauge_ref = ?")
                .bind(frequency)
                .bind(id)
                .execute(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
        }

        Self::find_by_id(conn, id).await
    }

    /// Writes a new lifecycle status.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: i64,
        status: GaugeStatus,
        now: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        sqlx::query("UPDATE gauges SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(())
    }

    pub async fn set_sealed(
        conn: &mut SqliteConnection,
        id: i64,
        sealed: bool,
        now: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        sqlx::query("UPDATE gauges SET is_sealed = ?, updated_at = ? WHERE id = ?")
            .bind(sealed)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(())
    }

    /// Writes the pairing triplet (public id, suffix, companion) in one
    /// statement; all three are set or cleared together.
    pub async fn set_pairing(
        conn: &mut SqliteConnection,
        id: i64,
        public_id: Option<&str>,
        suffix: Option<GaugeSuffix>,
        companion_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        sqlx::query(
            "UPDATE gauges SET gauge_id = ?, gauge_suffix = ?, companion_id = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(public_id)
        .bind(suffix.map(|s| s.as_str()))
        .bind(companion_id)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        Ok(())
    }

    pub async fn set_storage_location(
        conn: &mut SqliteConnection,
        id: i64,
        location: &str,
        now: DateTime<Utc>,
    ) -> Result<(), GaugeError> {
        sqlx::query("UPDATE gauges SET storage_location = ?, updated_at = ? WHERE id = ?")
            .bind(location)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(())
    }

    /// Reads the specification variant for a gauge.
    pub async fn specification(
        conn: &mut SqliteConnection,
        gauge: &Gauge,
    ) -> Result<Option<Specification>, GaugeError> {
        match gauge.equipment_type() {
            EquipmentType::ThreadGauge => {
                let row = sqlx::query(
                    "SELECT thread_size, thread_form, thread_class \
                     FROM thread_specifications WHERE gauge_ref = ?",
                )
                .bind(gauge.id())
                .fetch_optional(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
                row.map(|r| -> Result<Specification, GaugeError> {
                    Ok(Specification::Thread(ThreadSpecification {
                        thread_size: ThreadSize::parse(&get_text(&r, "thread_size")?)?,
                        thread_form: get_text(&r, "thread_form")?,
                        thread_class: get_text(&r, "thread_class")?,
                    }))
                })
                .transpose()
            }
            EquipmentType::HandTool => {
                let row = sqlx::query(
                    "SELECT tool_format, range_min, range_max, unit, resolution, accuracy \
                     FROM hand_tool_specifications WHERE gauge_ref = ?",
                )
                .bind(gauge.id())
                .fetch_optional(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
                row.map(|r| -> Result<Specification, GaugeError> {
                    Ok(Specification::HandTool(HandToolSpecification {
                        tool_format: get_text(&r, "tool_format")?,
                        range_min: r.try_get("range_min").map_err(classify_sqlx_error)?,
                        range_max: r.try_get("range_max").map_err(classify_sqlx_error)?,
                        unit: get_text(&r, "unit")?.parse::<MeasurementUnit>()?,
                        resolution: r.try_get("resolution").map_err(classify_sqlx_error)?,
                        accuracy: r.try_get("accuracy").map_err(classify_sqlx_error)?,
                    }))
                })
                .transpose()
            }
            EquipmentType::LargeEquipment => {
                let row = sqlx::query(
                    "SELECT equipment_kind, capacity \
                     FROM large_equipment_specifications WHERE gauge_ref = ?",
                )
                .bind(gauge.id())
                .fetch_optional(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
                row.map(|r| -> Result<Specification, GaugeError> {
                    Ok(Specification::LargeEquipment(LargeEquipmentSpecification {
                        equipment_kind: get_text(&r, "equipment_kind")?,
                        capacity: r.try_get("capacity").map_err(classify_sqlx_error)?,
                    }))
                })
                .transpose()
            }
            EquipmentType::CalibrationStandard => {
                let row = sqlx::query(
                    "SELECT standard_type, nominal_value, uncertainty \
                     FROM calibration_standard_specifications WHERE gauge_ref = ?",
                )
                .bind(gauge.id())
                .fetch_optional(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
                row.map(|r| -> Result<Specification, GaugeError> {
                    Ok(Specification::CalibrationStandard(
                        CalibrationStandardSpecification {
                            standard_type: get_text(&r, "standard_type")?,
                            nominal_value: get_text(&r, "nominal_value")?,
                            uncertainty: r.try_get("uncertainty").map_err(classify_sqlx_error)?,
                        },
                    ))
                })
                .transpose()
            }
        }
    }

    /// Hydrates a gauge into its view with the derived display name.
    pub async fn view(
        conn: &mut SqliteConnection,
        gauge: Gauge,
    ) -> Result<GaugeView, GaugeError> {
        let specification = Self::specification(conn, &gauge).await?;
        let display_name = display_name::display_name(&gauge, specification.as_ref());
        Ok(GaugeView {
            gauge,
            specification,
            display_name,
        })
    }

    /// Reads the calibration schedule for a gauge.
    pub async fn schedule(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
    ) -> Result<Option<CalibrationSchedule>, GaugeError> {
        let row = sqlx::query(
            "SELECT gauge_ref, frequency_days, last_completed_at, next_due_at \
             FROM calibration_schedules WHERE gauge_ref = ?",
        )
        .bind(gauge_ref)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(|r| -> Result<CalibrationSchedule, GaugeError> {
            Ok(CalibrationSchedule {
                gauge_ref: r.try_get("gauge_ref").map_err(classify_sqlx_error)?,
                frequency_days: r.try_get("frequency_days").map_err(classify_sqlx_error)?,
                last_completed_at: r
                    .try_get("last_completed_at")
                    .map_err(classify_sqlx_error)?,
                next_due_at: r.try_get("next_due_at").map_err(classify_sqlx_error)?,
            })
        })
        .transpose()
    }

    /// Persists a rolled-forward schedule.
    pub async fn save_schedule(
        conn: &mut SqliteConnection,
        schedule: &CalibrationSchedule,
    ) -> Result<(), GaugeError> {
        sqlx::query(
            "INSERT INTO calibration_schedules (gauge_ref, frequency_days, last_completed_at, next_due_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (gauge_ref) DO UPDATE SET frequency_days = excluded.frequency_days, \
             last_completed_at = excluded.last_completed_at, next_due_at = excluded.next_due_at",
        )
        .bind(schedule.gauge_ref)
        .bind(schedule.frequency_days)
        .bind(schedule.last_completed_at)
        .bind(schedule.next_due_at)
        .execute(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;
        Ok(())
    }

    /// Gauges whose next calibration falls before `cutoff`.
    pub async fn due_for_calibration(
        conn: &mut SqliteConnection,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CalibrationSchedule>, GaugeError> {
        let rows = sqlx::query(
            "SELECT gauge_ref, frequency_days, last_completed_at, next_due_at \
             FROM calibration_schedules WHERE next_due_at IS NOT NULL AND next_due_at <= ? \
             ORDER BY next_due_at",
        )
        .bind(cutoff)
        .fetch_all(&mut *conn)
        .await
        .map_err(classify_sqlx_error)?;

        rows.into_iter()
            .map(|r| -> Result<CalibrationSchedule, GaugeError> {
                Ok(CalibrationSchedule {
                    gauge_ref: r.try_get("gauge_ref").map_err(classify_sqlx_error)?,
                    frequency_days: r.try_get("frequency_days").map_err(classify_sqlx_error)?,
                    last_completed_at: r
                        .try_get("last_completed_at")
                        .map_err(classify_sqlx_error)?,
                    next_due_at: r.try_get("next_due_at").map_err(classify_sqlx_error)?,
                })
            })
            .collect()
    }

    async fn insert_specification(
        conn: &mut SqliteConnection,
        gauge_ref: i64,
        spec: &Specification,
    ) -> Result<(), GaugeError> {
        match spec {
            Specification::Thread(thread) => {
                sqlx::query(
                    "INSERT INTO thread_specifications (gauge_ref, thread_size, thread_form, thread_class) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(gauge_ref)
                .bind(thread.thread_size.as_str())
                .bind(&thread.thread_form)
                .bind(&thread.thread_class)
                .execute(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
            }
            Specification::HandTool(tool) => {
                sqlx::query(
                    "INSERT INTO hand_tool_specifications \
                     (gauge_ref, tool_format, range_min, range_max, unit, resolution, accuracy) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(gauge_ref)
                .bind(&tool.tool_format)
                .bind(tool.range_min)
                .bind(tool.range_max)
                .bind(tool.unit.as_str())
                .bind(tool.resolution)
                .bind(&tool.accuracy)
                .execute(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
            }
            Specification::LargeEquipment(le) => {
                sqlx::query(
                    "INSERT INTO large_equipment_specifications (gauge_ref, equipment_kind, capacity) \
                     VALUES (?, ?, ?)",
                )
                .bind(gauge_ref)
                .bind(&le.equipment_kind)
                .bind(&le.capacity)
                .execute(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
            }
            Specification::CalibrationStandard(cs) => {
                sqlx::query(
                    "INSERT INTO calibration_standard_specifications \
                     (gauge_ref, standard_type, nominal_value, uncertainty) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(gauge_ref)
                .bind(&cs.standard_type)
                .bind(&cs.nominal_value)
                .bind(&cs.uncertainty)
                .execute(&mut *conn)
                .await
                .map_err(classify_sqlx_error)?;
            }
        }
        Ok(())
    }
}

fn gauge_columns_qualified(alias: &str) -> String {
    GAUGE_COLUMNS
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn get_text(row: &SqliteRow, column: &str) -> Result<String, GaugeError> {
    row.try_get::<String, _>(column).map_err(classify_sqlx_error)
}

/// The single row-to-entity conversion point for gauges.
fn map_gauge_row(row: &SqliteRow) -> Result<Gauge, GaugeError> {
    let serial: Option<String> = row.try_get("serial_number").map_err(classify_sqlx_error)?;
    let suffix: Option<String> = row.try_get("gauge_suffix").map_err(classify_sqlx_error)?;

    let data = GaugeData {
        id: row.try_get("id").map_err(classify_sqlx_error)?,
        gauge_id: row.try_get("gauge_id").map_err(classify_sqlx_error)?,
        serial_number: serial.map(SerialNumber::new).transpose()?,
        equipment_type: get_text(row, "equipment_type")?.parse()?,
        category: row.try_get("category").map_err(classify_sqlx_error)?,
        ownership: get_text(row, "ownership")?.parse()?,
        owner_user_id: row.try_get("owner_user_id").map_err(classify_sqlx_error)?,
        status: get_text(row, "status")?.parse()?,
        is_sealed: row.try_get::<i64, _>("is_sealed").map_err(classify_sqlx_error)? != 0,
        unseal_pending: row
            .try_get::<i64, _>("unseal_pending")
            .map_err(classify_sqlx_error)?
            != 0,
        storage_location: row
            .try_get("storage_location")
            .map_err(classify_sqlx_error)?,
        manufacturer: row.try_get("manufacturer").map_err(classify_sqlx_error)?,
        model: row.try_get("model").map_err(classify_sqlx_error)?,
        calibration_frequency_days: row
            .try_get("calibration_frequency_days")
            .map_err(classify_sqlx_error)?,
        suffix: suffix.map(|s| s.parse()).transpose()?,
        companion_id: row.try_get("companion_id").map_err(classify_sqlx_error)?,
        custom_name: row.try_get("custom_name").map_err(classify_sqlx_error)?,
        created_at: row.try_get("created_at").map_err(classify_sqlx_error)?,
        updated_at: row.try_get("updated_at").map_err(classify_sqlx_error)?,
    };
    Gauge::from_data(data)
}

//! `SQLite` implementation of [`ScheduleRepository`].

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use haulhub_app::ports::ScheduleRepository;
use haulhub_domain::error::HaulHubError;
use haulhub_domain::geo::GeoPoint;
use haulhub_domain::id::ScheduleId;
use haulhub_domain::schedule::{PickupSchedule, ScheduleZone};
use haulhub_domain::time::{format_date, format_time};

use crate::codec::{
    decode, decode_date, decode_err, decode_json, decode_opt_date, decode_time, decode_ts,
    encode_json, encode_ts,
};
use crate::error::StorageError;

/// A schedule row; zones are attached afterwards.
struct Wrapper(PickupSchedule);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let frequency: String = row.try_get("frequency")?;
        let start_date: String = row.try_get("start_date")?;
        let rules: Option<String> = row.try_get("rules")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(PickupSchedule {
            id: decode(&id)?,
            municipality_id: row.try_get("municipality_id")?,
            name: row.try_get("name")?,
            schedule_type: row.try_get("schedule_type")?,
            description: row.try_get("description")?,
            frequency: decode(&frequency)?,
            start_date: decode_date(&start_date)?,
            end_date: decode_opt_date(row.try_get("end_date")?)?,
            rules: rules.as_deref().map(decode_json::<serde_json::Value>).transpose()?,
            is_active: row.try_get("is_active")?,
            zones: Vec::new(),
            created_at: decode_ts(&created_at)?,
        }))
    }
}

struct ZoneWrapper(ScheduleId, ScheduleZone);

impl<'r> FromRow<'r, SqliteRow> for ZoneWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let schedule_id: String = row.try_get("schedule_id")?;
        let pickup_day: String = row.try_get("pickup_day")?;
        let zip_codes: String = row.try_get("zip_codes")?;
        let center_lat: Option<f64> = row.try_get("center_lat")?;
        let center_lng: Option<f64> = row.try_get("center_lng")?;
        let time_start: String = row.try_get("time_start")?;
        let time_end: String = row.try_get("time_end")?;

        let center = match (center_lat, center_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng).map_err(decode_err)?),
            _ => None,
        };

        Ok(Self(
            decode(&schedule_id)?,
            ScheduleZone {
                id: decode(&id)?,
                name: row.try_get("name")?,
                pickup_day: decode(&pickup_day)?,
                zip_codes: decode_json(&zip_codes)?,
                center,
                radius_miles: row.try_get("radius_miles")?,
                time_start: decode_time(&time_start)?,
                time_end: decode_time(&time_end)?,
            },
        ))
    }
}

const INSERT: &str = r"
    INSERT INTO pickup_schedules (
        id, municipality_id, name, schedule_type, description, frequency,
        start_date, end_date, rules, is_active, created_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const INSERT_ZONE: &str = r"
    INSERT INTO schedule_zones (
        id, schedule_id, position, name, pickup_day, zip_codes, center_lat,
        center_lng, radius_miles, time_start, time_end
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM pickup_schedules WHERE id = ?";

const SELECT_ZONES: &str =
    "SELECT * FROM schedule_zones WHERE schedule_id = ? ORDER BY position ASC";

const SELECT_ACTIVE: &str =
    "SELECT * FROM pickup_schedules WHERE is_active = 1 ORDER BY created_at ASC, rowid ASC";

const SELECT_ACTIVE_ZONES: &str = r"
    SELECT z.* FROM schedule_zones z
    JOIN pickup_schedules s ON s.id = z.schedule_id
    WHERE s.is_active = 1
    ORDER BY z.schedule_id, z.position ASC
";

/// `SQLite`-backed pickup schedule repository.
#[derive(Clone)]
pub struct SqliteScheduleRepository {
    pool: SqlitePool,
}

impl SqliteScheduleRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ScheduleRepository for SqliteScheduleRepository {
    async fn create(&self, schedule: PickupSchedule) -> Result<PickupSchedule, HaulHubError> {
        let id = schedule.id.to_string();
        let rules = schedule.rules.as_ref().map(encode_json).transpose()?;
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(&id)
            .bind(&schedule.municipality_id)
            .bind(&schedule.name)
            .bind(&schedule.schedule_type)
            .bind(&schedule.description)
            .bind(schedule.frequency.as_str())
            .bind(format_date(schedule.start_date))
            .bind(schedule.end_date.map(format_date))
            .bind(rules)
            .bind(schedule.is_active)
            .bind(encode_ts(schedule.created_at))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        for (position, zone) in schedule.zones.iter().enumerate() {
            sqlx::query(INSERT_ZONE)
                .bind(zone.id.to_string())
                .bind(&id)
                .bind(i64::try_from(position).unwrap_or(i64::MAX))
                .bind(&zone.name)
                .bind(zone.pickup_day.as_str())
                .bind(encode_json(&zone.zip_codes)?)
                .bind(zone.center.map(|c| c.lat))
                .bind(zone.center.map(|c| c.lng))
                .bind(zone.radius_miles)
                .bind(format_time(zone.time_start))
                .bind(format_time(zone.time_end))
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
        }

        tx.commit().await.map_err(StorageError::from)?;
        tracing::debug!(schedule_id = %id, zones = schedule.zones.len(), "schedule stored");

        Ok(schedule)
    }

    async fn get_by_id(&self, id: ScheduleId) -> Result<Option<PickupSchedule>, HaulHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let Some(Wrapper(mut schedule)) = row else {
            return Ok(None);
        };

        let zones: Vec<ZoneWrapper> = sqlx::query_as(SELECT_ZONES)
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        schedule.zones = zones.into_iter().map(|z| z.1).collect();

        Ok(Some(schedule))
    }

    async fn list_active(&self) -> Result<Vec<PickupSchedule>, HaulHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ACTIVE)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let zones: Vec<ZoneWrapper> = sqlx::query_as(SELECT_ACTIVE_ZONES)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let mut by_schedule: HashMap<ScheduleId, Vec<ScheduleZone>> = HashMap::new();
        for ZoneWrapper(schedule_id, zone) in zones {
            by_schedule.entry(schedule_id).or_default().push(zone);
        }

        Ok(rows
            .into_iter()
            .map(|Wrapper(mut schedule)| {
                schedule.zones = by_schedule.remove(&schedule.id).unwrap_or_default();
                schedule
            })
            .collect())
    }
}

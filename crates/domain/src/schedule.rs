//! Pickup schedules: municipal collection calendars split into zones.
//!
//! A schedule does not store its pickup dates. Occurrences are generated
//! from the schedule's [`Frequency`], its validity window and each zone's
//! [`PickupDay`]:
//!
//! - `weekly`: every pickup weekday on or after the start date
//! - `biweekly`: every 14 days, anchored on the first pickup weekday on or
//!   after the start date
//! - `monthly`: the first pickup weekday of each month

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geo::GeoPoint;
use crate::id::{ScheduleId, ZoneId};
use crate::time::{Timestamp, hhmm, now};

wire_enum!(
    /// How often a schedule repeats.
    Frequency, field = "frequency" {
        Weekly => "weekly",
        Biweekly => "biweekly",
        Monthly => "monthly",
    }
);

wire_enum!(
    /// Day of the week a zone is collected.
    PickupDay, field = "pickupDay" {
        Monday => "monday",
        Tuesday => "tuesday",
        Wednesday => "wednesday",
        Thursday => "thursday",
        Friday => "friday",
        Saturday => "saturday",
        Sunday => "sunday",
    }
);

impl PickupDay {
    #[must_use]
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Tuesday => Weekday::Tue,
            Self::Wednesday => Weekday::Wed,
            Self::Thursday => Weekday::Thu,
            Self::Friday => Weekday::Fri,
            Self::Saturday => Weekday::Sat,
            Self::Sunday => Weekday::Sun,
        }
    }
}

/// Part of a municipality collected on the same day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleZone {
    pub id: ZoneId,
    pub name: String,
    pub pickup_day: PickupDay,
    pub zip_codes: Vec<String>,
    pub center: Option<GeoPoint>,
    pub radius_miles: Option<f64>,
    #[serde(with = "hhmm")]
    pub time_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub time_end: NaiveTime,
}

impl ScheduleZone {
    /// A zone with no coverage yet and the default 08:00–17:00 window.
    #[must_use]
    pub fn new(name: impl Into<String>, pickup_day: PickupDay) -> Self {
        Self {
            id: ZoneId::new(),
            name: name.into(),
            pickup_day,
            zip_codes: Vec::new(),
            center: None,
            radius_miles: None,
            time_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            time_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    #[must_use]
    pub fn with_zip_codes(mut self, zip_codes: Vec<String>) -> Self {
        self.zip_codes = zip_codes;
        self
    }

    #[must_use]
    pub fn with_area(mut self, center: GeoPoint, radius_miles: f64) -> Self {
        self.center = Some(center);
        self.radius_miles = Some(radius_miles);
        self
    }

    #[must_use]
    pub fn covers_zip(&self, zip: &str) -> bool {
        self.zip_codes.iter().any(|z| z == zip)
    }

    /// Whether `point` lies inside the zone's circle. Zones without a center
    /// and radius never match by point.
    #[must_use]
    pub fn covers_point(&self, point: &GeoPoint) -> bool {
        match (self.center, self.radius_miles) {
            (Some(center), Some(radius)) => center.distance_miles(point) <= radius,
            _ => false,
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name is blank, the radius is not
    /// positive, or the window ends before it starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("zone_name"));
        }
        if self.radius_miles.is_some_and(|r| r <= 0.0) {
            return Err(ValidationError::InvalidField {
                field: "radius_miles",
                reason: "must be positive".to_string(),
            });
        }
        if self.time_end < self.time_start {
            return Err(ValidationError::InvalidField {
                field: "time_end",
                reason: "must not be before time_start".to_string(),
            });
        }
        Ok(())
    }
}

/// A municipality-defined recurring collection calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupSchedule {
    pub id: ScheduleId,
    pub municipality_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub schedule_type: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub rules: Option<serde_json::Value>,
    pub is_active: bool,
    pub zones: Vec<ScheduleZone>,
    pub created_at: Timestamp,
}

impl PickupSchedule {
    /// Create an active schedule with no zones.
    #[must_use]
    pub fn new(
        municipality_id: impl Into<String>,
        name: impl Into<String>,
        schedule_type: impl Into<String>,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: ScheduleId::new(),
            municipality_id: municipality_id.into(),
            name: name.into(),
            schedule_type: schedule_type.into(),
            description: None,
            frequency,
            start_date,
            end_date: None,
            rules: None,
            is_active: true,
            zones: Vec::new(),
            created_at: now(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a required text field is blank, the
    /// end date precedes the start date, or a zone is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("municipality_id", &self.municipality_id),
            ("schedule_name", &self.name),
            ("schedule_type", &self.schedule_type),
        ];
        if let Some((field, _)) = required.into_iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ValidationError::MissingField(field));
        }
        if self.end_date.is_some_and(|end| end < self.start_date) {
            return Err(ValidationError::InvalidField {
                field: "end_date",
                reason: "must not be before start_date".to_string(),
            });
        }
        self.zones.iter().try_for_each(ScheduleZone::validate)
    }

    /// Lazily generate the pickup dates of `zone` on or after `from`,
    /// bounded by the schedule's own start and end dates.
    pub fn pickup_dates(
        &self,
        zone: &ScheduleZone,
        from: NaiveDate,
    ) -> Box<dyn Iterator<Item = NaiveDate>> {
        let weekday = zone.pickup_day.weekday();
        let lower = from.max(self.start_date);
        let end = self.end_date;

        let dates: Box<dyn Iterator<Item = NaiveDate>> = match self.frequency {
            Frequency::Weekly => every(first_weekday_on_or_after(lower, weekday), 7),
            Frequency::Biweekly => match first_weekday_on_or_after(self.start_date, weekday) {
                Some(anchor) => {
                    let behind = (lower - anchor).num_days().max(0);
                    let periods = u64::try_from((behind + 13) / 14).unwrap_or(0);
                    every(anchor.checked_add_days(Days::new(periods * 14)), 14)
                }
                None => Box::new(std::iter::empty()),
            },
            Frequency::Monthly => {
                let first_month = NaiveDate::from_ymd_opt(lower.year(), lower.month(), 1);
                Box::new(
                    std::iter::successors(first_month, |m| m.checked_add_months(Months::new(1)))
                        .filter_map(move |m| first_weekday_on_or_after(m, weekday))
                        .filter(move |d| *d >= lower),
                )
            }
        };

        Box::new(dates.take_while(move |d| end.is_none_or(|end| *d <= end)))
    }

    /// Pickup dates of `zone` within `from..=to`.
    #[must_use]
    pub fn occurrences(&self, zone: &ScheduleZone, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        self.pickup_dates(zone, from)
            .take_while(|d| *d <= to)
            .collect()
    }

    /// First pickup of `zone` on or after `from`, if the schedule has any left.
    #[must_use]
    pub fn next_pickup(&self, zone: &ScheduleZone, from: NaiveDate) -> Option<NaiveDate> {
        self.pickup_dates(zone, from).next()
    }

    /// Every zone's pickups within `from..=to`, ordered by date then zone
    /// name, capped at `limit`.
    #[must_use]
    pub fn events(&self, from: NaiveDate, to: NaiveDate, limit: usize) -> Vec<PickupEvent> {
        // The first `limit` events overall are among each zone's first `limit`.
        let mut events: Vec<PickupEvent> = self
            .zones
            .iter()
            .flat_map(|zone| {
                self.pickup_dates(zone, from)
                    .take_while(move |d| *d <= to)
                    .take(limit)
                    .map(move |date| PickupEvent::new(zone, date))
            })
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.zone.name.cmp(&b.zone.name)));
        events.truncate(limit);
        events
    }
}

fn first_weekday_on_or_after(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + weekday.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(u64::from(ahead)))
}

fn every(first: Option<NaiveDate>, step_days: u64) -> Box<dyn Iterator<Item = NaiveDate>> {
    Box::new(std::iter::successors(first, move |d| {
        d.checked_add_days(Days::new(step_days))
    }))
}

/// Short zone reference embedded in events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRef {
    pub id: ZoneId,
    pub name: String,
}

/// One generated pickup occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupEvent {
    /// `<zone id>:<date>`, stable across calls.
    pub id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub time_end: NaiveTime,
    pub status: &'static str,
    pub zone: ZoneRef,
}

impl PickupEvent {
    fn new(zone: &ScheduleZone, date: NaiveDate) -> Self {
        Self {
            id: format!("{}:{date}", zone.id),
            date,
            time_start: zone.time_start,
            time_end: zone.time_end,
            status: "scheduled",
            zone: ZoneRef {
                id: zone.id,
                name: zone.name.clone(),
            },
        }
    }
}

/// Where a caller wants to know their pickups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationQuery {
    pub zip_code: Option<String>,
    pub point: Option<GeoPoint>,
}

impl LocationQuery {
    /// Build a query from the raw lookup parameters.
    ///
    /// A ZIP code found in `address` is used when `zip_code` is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingLocation`] unless an address, both
    /// coordinates, or a ZIP code is given, and
    /// [`ValidationError::InvalidField`] for out-of-range coordinates.
    pub fn new(
        address: Option<&str>,
        lat: Option<f64>,
        lng: Option<f64>,
        zip_code: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let address = address.map(str::trim).filter(|a| !a.is_empty());
        let zip_code = zip_code.map(str::trim).filter(|z| !z.is_empty());
        let point = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
            _ => None,
        };
        if address.is_none() && zip_code.is_none() && point.is_none() {
            return Err(ValidationError::MissingLocation);
        }
        Ok(Self {
            zip_code: zip_code
                .map(str::to_string)
                .or_else(|| address.and_then(extract_zip)),
            point,
        })
    }

    fn matches(&self, zone: &ScheduleZone) -> bool {
        self.zip_code.as_deref().is_some_and(|zip| zone.covers_zip(zip))
            || self.point.as_ref().is_some_and(|p| zone.covers_point(p))
    }
}

/// Last standalone 5-digit token in a free-form address.
fn extract_zip(address: &str) -> Option<String> {
    address
        .split(|c: char| !c.is_ascii_digit())
        .rev()
        .find(|token| token.len() == 5)
        .map(str::to_string)
}

/// Zone summary embedded in lookup results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    pub id: ZoneId,
    pub name: String,
    pub pickup_day: PickupDay,
}

/// A schedule zone serving the looked-up location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMatch {
    pub id: ScheduleId,
    pub name: String,
    #[serde(rename = "type")]
    pub schedule_type: String,
    pub frequency: Frequency,
    pub next_pickup_date: Option<NaiveDate>,
    pub zone: ZoneSummary,
}

/// Match active schedules against `query`, one entry per matching zone.
#[must_use]
pub fn lookup(schedules: &[PickupSchedule], query: &LocationQuery, today: NaiveDate) -> Vec<ScheduleMatch> {
    schedules
        .iter()
        .filter(|s| s.is_active)
        .flat_map(|schedule| {
            schedule
                .zones
                .iter()
                .filter(|zone| query.matches(zone))
                .map(move |zone| ScheduleMatch {
                    id: schedule.id,
                    name: schedule.name.clone(),
                    schedule_type: schedule.schedule_type.clone(),
                    frequency: schedule.frequency,
                    next_pickup_date: schedule.next_pickup(zone, today),
                    zone: ZoneSummary {
                        id: zone.id,
                        name: zone.name.clone(),
                        pickup_day: zone.pickup_day,
                    },
                })
        })
        .collect()
}

//! Time, date and timestamp helpers.
//!
//! Wire formats: dates are `YYYY-MM-DD`, times of day `HH:MM`, timestamps
//! RFC 3339 in UTC.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for `created_at`, `expires_at`, event times, etc.
pub type Timestamp = DateTime<Utc>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Today's date in UTC.
#[must_use]
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Render a timestamp the way API envelopes report it (microseconds, `Z`).
#[must_use]
pub fn to_wire(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] when `value` does not match.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_owned()))
}

/// Parse an `HH:MM` time of day.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDateTime`] when `value` does not match.
pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidDateTime(value.to_owned()))
}

/// Parse a date that is submitted together with a time of day, so a failure
/// reports both expected formats.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDateTime`] when `value` does not match.
pub fn parse_slot_date(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_date(value).map_err(|_| ValidationError::InvalidDateTime(value.to_owned()))
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a time of day as `HH:MM`.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Serde adapter for `HH:MM` times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::missing_errors_doc)]
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional `HH:MM` times.
pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::missing_errors_doc, clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_str(&super::format_time(*time)),
            None => serializer.serialize_none(),
        }
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_time(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

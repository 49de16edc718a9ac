//! Column encodings shared by the repositories.
//!
//! Every decode failure is reported as [`sqlx::Error::Decode`] so it surfaces
//! from `FromRow` like any other malformed column.

use std::error::Error;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use haulhub_domain::time::{self, Timestamp};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

pub(crate) fn decode_err<E: Error + Send + Sync + 'static>(err: E) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

/// Timestamps use a fixed width so `ORDER BY created_at` sorts chronologically.
pub(crate) fn encode_ts(ts: Timestamp) -> String {
    time::to_wire(ts)
}

pub(crate) fn decode_ts(raw: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.to_utc())
        .map_err(decode_err)
}

pub(crate) fn decode_opt_ts(raw: Option<String>) -> Result<Option<Timestamp>, sqlx::Error> {
    raw.as_deref().map(decode_ts).transpose()
}

pub(crate) fn decode_date(raw: &str) -> Result<NaiveDate, sqlx::Error> {
    time::parse_date(raw).map_err(decode_err)
}

pub(crate) fn decode_opt_date(raw: Option<String>) -> Result<Option<NaiveDate>, sqlx::Error> {
    raw.as_deref().map(decode_date).transpose()
}

pub(crate) fn decode_time(raw: &str) -> Result<NaiveTime, sqlx::Error> {
    time::parse_time(raw).map_err(decode_err)
}

pub(crate) fn decode_opt_time(raw: Option<String>) -> Result<Option<NaiveTime>, sqlx::Error> {
    raw.as_deref().map(decode_time).transpose()
}

/// Identifiers and closed string enums.
pub(crate) fn decode<T>(raw: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(decode_err)
}

pub(crate) fn decode_opt<T>(raw: Option<String>) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    raw.as_deref().map(decode).transpose()
}

pub(crate) fn decode_u32(raw: i64) -> Result<u32, sqlx::Error> {
    u32::try_from(raw).map_err(decode_err)
}

pub(crate) fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, sqlx::Error> {
    serde_json::from_str(raw).map_err(decode_err)
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> Result<String, StorageError> {
    Ok(serde_json::to_string(value)?)
}

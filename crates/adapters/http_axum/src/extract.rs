//! Request extractors that report failures in the API envelope.

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;

use haulhub_domain::id::UserId;

use crate::error::ApiError;

/// Header carrying the acting user's id.
pub const USER_HEADER: &str = "x-user-id";

const INVALID_JSON_MESSAGE: &str = "Request body must be valid JSON";

fn invalid_json() -> ApiError {
    ApiError::bad_request("INVALID_JSON", INVALID_JSON_MESSAGE)
}

fn from_object<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|err| ApiError::bad_request("INVALID_FIELD", err.to_string()))
}

/// A JSON object body. Anything else, including `{}`, is `INVALID_JSON`.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request("INVALID_JSON", err.body_text()))?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|_| invalid_json())?;
        match &value {
            Value::Object(map) if !map.is_empty() => from_object(value).map(Self),
            _ => Err(invalid_json()),
        }
    }
}

/// A JSON object body that may be missing or empty.
pub struct OptionalJsonBody<T>(pub T);

impl<T, S> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request("INVALID_JSON", err.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        let value: Value = serde_json::from_slice(&bytes).map_err(|_| invalid_json())?;
        match value {
            Value::Object(map) if map.is_empty() => Ok(Self(T::default())),
            Value::Object(_) => from_object(value).map(Self),
            Value::Null => Ok(Self(T::default())),
            _ => Err(invalid_json()),
        }
    }
}

/// Query string parameters; unparsable values are `INVALID_PARAMETER`.
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| ApiError::bad_request("INVALID_PARAMETER", err.body_text()))?;
        Ok(Self(params))
    }
}

/// The acting user, taken from the `X-User-Id` header.
///
/// Requests without the header act as [`UserId::guest`].
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(UserId::guest, UserId::new);
        Ok(Self(user))
    }
}

/// Return the first field still missing, in the order given.
///
/// # Errors
///
/// Returns [`ApiError`] with code `MISSING_FIELD` naming the field.
pub fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ApiError> {
    value.ok_or_else(|| haulhub_domain::error::ValidationError::MissingField(field).into())
}

/// Like [`required`], but a blank string counts as missing.
///
/// # Errors
///
/// Returns [`ApiError`] with code `MISSING_FIELD` naming the field.
pub fn required_text(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    required(value.filter(|text| !text.trim().is_empty()), field)
}

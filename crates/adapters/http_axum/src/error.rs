//! HTTP error response mapping.
//!
//! Every failure leaves the API as an envelope with `success: false` and a
//! stable, machine-readable `error.code`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use haulhub_domain::error::{
    Entity, HaulHubError, NotFoundError, TransitionError, ValidationError,
};

use crate::envelope::Envelope;

/// An error leaving a handler.
#[derive(Debug)]
pub enum ApiError {
    /// A failure reported by the application or domain layer.
    Domain(HaulHubError),
    /// A request the handler could not even decode.
    BadRequest { code: &'static str, message: String },
}

impl ApiError {
    /// Reject a malformed request before it reaches a service.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    /// Status code and error code for this error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest { code, .. } => (StatusCode::BAD_REQUEST, *code),
            Self::Domain(HaulHubError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, validation_code(err))
            }
            Self::Domain(HaulHubError::NotFound(err)) => (StatusCode::NOT_FOUND, not_found_code(err)),
            Self::Domain(HaulHubError::Transition(err)) => {
                (StatusCode::BAD_REQUEST, transition_code(err))
            }
            Self::Domain(HaulHubError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl From<HaulHubError> for ApiError {
    fn from(err: HaulHubError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

fn validation_code(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::MissingField(_) => "MISSING_FIELD",
        ValidationError::InvalidDate(_) | ValidationError::InvalidDateTime(_) => {
            "INVALID_DATE_FORMAT"
        }
        ValidationError::InvalidRating(_) => "INVALID_RATING",
        ValidationError::MissingLocation => "MISSING_PARAMETERS",
        ValidationError::InvalidField { .. } => "INVALID_FIELD",
        ValidationError::InvalidId(_) => "INVALID_ID",
    }
}

fn not_found_code(err: &NotFoundError) -> &'static str {
    match err.entity {
        Entity::ServiceRequest => "REQUEST_NOT_FOUND",
        Entity::Quote => "QUOTE_NOT_FOUND",
        Entity::Booking => "BOOKING_NOT_FOUND",
        Entity::Business | Entity::BusinessProfile => "BUSINESS_NOT_FOUND",
        Entity::Schedule => "SCHEDULE_NOT_FOUND",
        Entity::Subscription => "SUBSCRIPTION_NOT_FOUND",
        Entity::Route => "NOT_FOUND",
    }
}

fn transition_code(err: &TransitionError) -> &'static str {
    match err {
        TransitionError::BookingCannotBeCancelled(_) => "BOOKING_CANNOT_BE_CANCELLED",
        TransitionError::BookingNotConfirmed => "BOOKING_NOT_CONFIRMED",
        TransitionError::BookingNotInProgress => "BOOKING_NOT_IN_PROGRESS",
        TransitionError::QuoteNotPending(_) => "QUOTE_NOT_PENDING",
        TransitionError::QuoteExpired => "QUOTE_EXPIRED",
        TransitionError::RequestNotOpen(_) => "REQUEST_NOT_OPEN",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match self {
            Self::BadRequest { message, .. } => message,
            Self::Domain(HaulHubError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                err.to_string()
            }
            Self::Domain(err) => err.to_string(),
        };

        (status, Envelope::<()>::failure(code, message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_code(err: impl Into<HaulHubError>) -> (StatusCode, &'static str) {
        ApiError::from(err.into()).status_and_code()
    }

    #[test]
    fn should_map_validation_errors_to_bad_request_codes() {
        assert_eq!(
            status_and_code(ValidationError::MissingField("addressId")),
            (StatusCode::BAD_REQUEST, "MISSING_FIELD")
        );
        assert_eq!(
            status_and_code(ValidationError::InvalidDateTime("10am".to_string())),
            (StatusCode::BAD_REQUEST, "INVALID_DATE_FORMAT")
        );
        assert_eq!(
            status_and_code(ValidationError::MissingLocation),
            (StatusCode::BAD_REQUEST, "MISSING_PARAMETERS")
        );
    }

    #[test]
    fn should_map_not_found_entities_to_specific_codes() {
        let err = NotFoundError {
            entity: Entity::BusinessProfile,
            id: "user_123".to_string(),
        };
        assert_eq!(
            status_and_code(err),
            (StatusCode::NOT_FOUND, "BUSINESS_NOT_FOUND")
        );
        let err = NotFoundError {
            entity: Entity::ServiceRequest,
            id: "x".to_string(),
        };
        assert_eq!(status_and_code(err).1, "REQUEST_NOT_FOUND");
    }

    #[test]
    fn should_give_every_entity_a_not_found_code() {
        for entity in Entity::ALL {
            let err = NotFoundError {
                entity: *entity,
                id: "x".to_string(),
            };
            let (status, code) = status_and_code(err);
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(code.ends_with("NOT_FOUND"), "{entity}: {code}");
        }
        let err = NotFoundError {
            entity: Entity::Subscription,
            id: "x".to_string(),
        };
        assert_eq!(status_and_code(err).1, "SUBSCRIPTION_NOT_FOUND");
    }

    #[test]
    fn should_map_transition_errors_to_bad_request() {
        assert_eq!(
            status_and_code(TransitionError::BookingCannotBeCancelled("completed".to_string())),
            (StatusCode::BAD_REQUEST, "BOOKING_CANNOT_BE_CANCELLED")
        );
        assert_eq!(
            status_and_code(TransitionError::QuoteExpired).1,
            "QUOTE_EXPIRED"
        );
    }

    #[test]
    fn should_map_storage_errors_to_internal_error() {
        let err = HaulHubError::Storage(Box::new(std::io::Error::other("disk full")));
        assert_eq!(
            ApiError::from(err).status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }
}

//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HaulHubError`]
//! via `#[from]`. Storage failures are boxed so the domain never names an IO
//! crate.

/// Top-level error returned by domain logic, services and repositories.
#[derive(Debug, thiserror::Error)]
pub enum HaulHubError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Input that breaks a domain invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Field {0} is required")]
    MissingField(&'static str),

    #[error("Date must be in YYYY-MM-DD format")]
    InvalidDate(String),

    #[error("Date must be in YYYY-MM-DD format, time in HH:MM format")]
    InvalidDateTime(String),

    #[error("Rating must be between 1 and 5")]
    InvalidRating(i64),

    #[error("Address, coordinates, or ZIP code is required")]
    MissingLocation,

    #[error("Invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

wire_enum!(
    /// Kind of record a lookup can miss. The text is used in messages.
    Entity, field = "entity" {
        ServiceRequest => "Service request",
        Quote => "Quote",
        Booking => "Booking",
        Business => "Business",
        BusinessProfile => "Business profile",
        Schedule => "Schedule",
        Subscription => "Subscription",
        Route => "Route",
    }
);

/// A lookup that matched nothing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{entity} not found")]
pub struct NotFoundError {
    pub entity: Entity,
    pub id: String,
}

/// A state change that the current status does not allow.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("Booking with status {0} cannot be cancelled")]
    BookingCannotBeCancelled(String),

    #[error("Only confirmed bookings can be started")]
    BookingNotConfirmed,

    #[error("Only bookings in progress can be completed")]
    BookingNotInProgress,

    #[error("Quote with status {0} cannot be accepted")]
    QuoteNotPending(String),

    #[error("Quote has expired")]
    QuoteExpired,

    #[error("Service request with status {0} no longer accepts quotes or bookings")]
    RequestNotOpen(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_missing_field_message() {
        let err = ValidationError::MissingField("addressId");
        assert_eq!(err.to_string(), "Field addressId is required");
    }

    #[test]
    fn should_keep_message_when_wrapped() {
        let err: HaulHubError = TransitionError::BookingNotInProgress.into();
        assert_eq!(
            err.to_string(),
            "Only bookings in progress can be completed"
        );
    }

    #[test]
    fn should_name_entity_in_not_found_message() {
        let err = NotFoundError {
            entity: Entity::Booking,
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Booking not found");
    }
}

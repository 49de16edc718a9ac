//! Typed identifier newtypes backed by UUIDs, plus the opaque [`UserId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }

            /// Parse user input, reporting failures as a validation error.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::InvalidId`] when `value` is not a UUID.
            pub fn parse(value: &str) -> Result<Self, ValidationError> {
                Self::from_str(value).map_err(|_| ValidationError::InvalidId(value.to_owned()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`ServiceRequest`](crate::service_request::ServiceRequest).
    ServiceRequestId
);

define_id!(
    /// Unique identifier for a [`Quote`](crate::quote::Quote).
    QuoteId
);

define_id!(
    /// Unique identifier for a [`Booking`](crate::booking::Booking).
    BookingId
);

define_id!(
    /// Unique identifier for a [`Business`](crate::business::Business).
    BusinessId
);

define_id!(
    /// Unique identifier for a [`ServiceOffering`](crate::business::ServiceOffering).
    OfferingId
);

define_id!(
    /// Unique identifier for a [`Review`](crate::review::Review).
    ReviewId
);

define_id!(
    /// Unique identifier for a [`PickupSchedule`](crate::schedule::PickupSchedule).
    ScheduleId
);

define_id!(
    /// Unique identifier for a [`ScheduleZone`](crate::schedule::ScheduleZone).
    ZoneId
);

define_id!(
    /// Unique identifier for a [`Subscription`](crate::subscription::Subscription).
    SubscriptionId
);

/// Opaque identifier of the acting user (customer, business owner, admin).
///
/// Users live outside this system, so the value is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// User assumed when a request carries no identity.
    pub const GUEST: &'static str = "guest";

    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn guest() -> Self {
        Self::new(Self::GUEST)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Service request: a customer's job description awaiting quotes.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{HaulHubError, TransitionError, ValidationError};
use crate::id::{ServiceRequestId, UserId};
use crate::time::{Timestamp, hhmm_opt, now};

/// How long a request stays open for quotes.
pub const REQUEST_TTL_DAYS: i64 = 7;

wire_enum!(
    /// How soon the customer needs the job done.
    UrgencyLevel, field = "urgencyLevel", default = Normal {
        Low => "low",
        Normal => "normal",
        High => "high",
        Emergency => "emergency",
    }
);

wire_enum!(
    /// Lifecycle of a service request.
    RequestStatus, field = "status" {
        Open => "open",
        Booked => "booked",
        Cancelled => "cancelled",
        Expired => "expired",
    }
);

/// A customer-submitted job description awaiting quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: ServiceRequestId,
    pub customer_user_id: UserId,
    pub address_id: String,
    pub service_category: String,
    pub description: String,
    pub preferred_date: Option<NaiveDate>,
    #[serde(default, with = "hhmm_opt")]
    pub preferred_time_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt")]
    pub preferred_time_end: Option<NaiveTime>,
    pub urgency_level: UrgencyLevel,
    pub estimated_budget: Option<f64>,
    pub special_instructions: Option<String>,
    pub photos: Vec<String>,
    pub status: RequestStatus,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ServiceRequest {
    /// Create a builder for constructing a [`ServiceRequest`].
    #[must_use]
    pub fn builder() -> ServiceRequestBuilder {
        ServiceRequestBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] when a required text field is
    /// blank, the preferred window ends before it starts, or the budget is
    /// negative.
    pub fn validate(&self) -> Result<(), HaulHubError> {
        if self.address_id.trim().is_empty() {
            return Err(ValidationError::MissingField("addressId").into());
        }
        if self.service_category.trim().is_empty() {
            return Err(ValidationError::MissingField("serviceCategory").into());
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description").into());
        }
        if let (Some(start), Some(end)) = (self.preferred_time_start, self.preferred_time_end) {
            if end < start {
                return Err(ValidationError::InvalidField {
                    field: "preferredTimeEnd",
                    reason: "must not be before preferredTimeStart".to_string(),
                }
                .into());
            }
        }
        if self.estimated_budget.is_some_and(|budget| budget < 0.0) {
            return Err(ValidationError::InvalidField {
                field: "estimatedBudget",
                reason: "must not be negative".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Status as seen at `at`: an open request past its expiry reads as expired.
    #[must_use]
    pub fn effective_status(&self, at: Timestamp) -> RequestStatus {
        if self.status == RequestStatus::Open && self.expires_at <= at {
            RequestStatus::Expired
        } else {
            self.status
        }
    }

    /// Ensure quotes and bookings can still be attached at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::RequestNotOpen`] otherwise.
    pub fn ensure_open(&self, at: Timestamp) -> Result<(), TransitionError> {
        match self.effective_status(at) {
            RequestStatus::Open => Ok(()),
            other => Err(TransitionError::RequestNotOpen(other.to_string())),
        }
    }

    /// Record that a quote on this request was accepted.
    pub fn mark_booked(&mut self, at: Timestamp) {
        self.status = RequestStatus::Booked;
        self.updated_at = at;
    }
}

/// Step-by-step builder for [`ServiceRequest`].
#[derive(Debug, Default)]
pub struct ServiceRequestBuilder {
    id: Option<ServiceRequestId>,
    customer_user_id: Option<UserId>,
    address_id: Option<String>,
    service_category: Option<String>,
    description: Option<String>,
    preferred_date: Option<NaiveDate>,
    preferred_time_start: Option<NaiveTime>,
    preferred_time_end: Option<NaiveTime>,
    urgency_level: Option<UrgencyLevel>,
    estimated_budget: Option<f64>,
    special_instructions: Option<String>,
    photos: Vec<String>,
    created_at: Option<Timestamp>,
}

impl ServiceRequestBuilder {
    #[must_use]
    pub fn id(mut self, id: ServiceRequestId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn customer_user_id(mut self, user: UserId) -> Self {
        self.customer_user_id = Some(user);
        self
    }

    #[must_use]
    pub fn address_id(mut self, address_id: impl Into<String>) -> Self {
        self.address_id = Some(address_id.into());
        self
    }

    #[must_use]
    pub fn service_category(mut self, category: impl Into<String>) -> Self {
        self.service_category = Some(category.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn preferred_date(mut self, date: Option<NaiveDate>) -> Self {
        self.preferred_date = date;
        self
    }

    #[must_use]
    pub fn preferred_window(mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.preferred_time_start = start;
        self.preferred_time_end = end;
        self
    }

    #[must_use]
    pub fn urgency_level(mut self, level: UrgencyLevel) -> Self {
        self.urgency_level = Some(level);
        self
    }

    #[must_use]
    pub fn estimated_budget(mut self, budget: Option<f64>) -> Self {
        self.estimated_budget = budget;
        self
    }

    #[must_use]
    pub fn special_instructions(mut self, instructions: Option<String>) -> Self {
        self.special_instructions = instructions;
        self
    }

    #[must_use]
    pub fn photos(mut self, photos: Vec<String>) -> Self {
        self.photos = photos;
        self
    }

    #[must_use]
    pub fn created_at(mut self, at: Timestamp) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Consume the builder, validate, and return an open [`ServiceRequest`]
    /// that expires [`REQUEST_TTL_DAYS`] after creation.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] if invariants fail.
    pub fn build(self) -> Result<ServiceRequest, HaulHubError> {
        let created_at = self.created_at.unwrap_or_else(now);
        let request = ServiceRequest {
            id: self.id.unwrap_or_default(),
            customer_user_id: self.customer_user_id.unwrap_or_else(UserId::guest),
            address_id: self.address_id.unwrap_or_default(),
            service_category: self.service_category.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            preferred_date: self.preferred_date,
            preferred_time_start: self.preferred_time_start,
            preferred_time_end: self.preferred_time_end,
            urgency_level: self.urgency_level.unwrap_or_default(),
            estimated_budget: self.estimated_budget,
            special_instructions: self.special_instructions,
            photos: self.photos,
            status: RequestStatus::Open,
            expires_at: created_at + Duration::days(REQUEST_TTL_DAYS),
            created_at,
            updated_at: created_at,
        };
        request.validate()?;
        Ok(request)
    }
}

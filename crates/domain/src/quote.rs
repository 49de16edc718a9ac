//! Quote: a business's priced offer against a service request.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{HaulHubError, TransitionError, ValidationError};
use crate::id::{BusinessId, QuoteId, ServiceRequestId};
use crate::time::{Timestamp, now};

/// Days a quote stays valid when the business does not say otherwise.
pub const DEFAULT_VALID_DAYS: i64 = 3;

/// Longest validity period a business may give a quote.
pub const MAX_VALID_DAYS: i64 = 365;

wire_enum!(
    /// Lifecycle of a quote.
    QuoteStatus, field = "status", default = Pending {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
        Expired => "expired",
        Withdrawn => "withdrawn",
    }
);

/// A priced offer from a business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub request_id: ServiceRequestId,
    pub business_id: BusinessId,
    pub amount: f64,
    pub details: Option<String>,
    pub estimated_duration: Option<f64>,
    pub materials_included: bool,
    pub disposal_included: bool,
    pub additional_fees: BTreeMap<String, f64>,
    pub valid_until: Timestamp,
    pub status: QuoteStatus,
    pub terms_and_conditions: Option<String>,
    pub created_at: Timestamp,
}

/// The parts of a quote a business fills in.
#[derive(Debug, Clone, Default)]
pub struct QuoteDraft {
    pub business_id: Option<BusinessId>,
    pub amount: Option<f64>,
    pub details: Option<String>,
    pub estimated_duration: Option<f64>,
    pub materials_included: bool,
    pub disposal_included: bool,
    pub additional_fees: BTreeMap<String, f64>,
    pub valid_days: Option<i64>,
    pub terms_and_conditions: Option<String>,
}

impl QuoteDraft {
    /// Turn the draft into a pending [`Quote`] on `request_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] when the business or amount is
    /// missing, any amount or duration is not positive, or the validity
    /// period is outside `1..=MAX_VALID_DAYS`.
    pub fn into_quote(self, request_id: ServiceRequestId) -> Result<Quote, HaulHubError> {
        let business_id = self
            .business_id
            .ok_or(ValidationError::MissingField("businessId"))?;
        let amount = self.amount.ok_or(ValidationError::MissingField("amount"))?;
        let valid_days = self.valid_days.unwrap_or(DEFAULT_VALID_DAYS);
        if !(1..=MAX_VALID_DAYS).contains(&valid_days) {
            return Err(ValidationError::InvalidField {
                field: "validDays",
                reason: format!("must be between 1 and {MAX_VALID_DAYS}"),
            }
            .into());
        }
        let created_at = now();
        let quote = Quote {
            id: QuoteId::new(),
            request_id,
            business_id,
            amount,
            details: self.details,
            estimated_duration: self.estimated_duration,
            materials_included: self.materials_included,
            disposal_included: self.disposal_included,
            additional_fees: self.additional_fees,
            valid_until: created_at + Duration::days(valid_days),
            status: QuoteStatus::Pending,
            terms_and_conditions: self.terms_and_conditions,
            created_at,
        };
        quote.validate()?;
        Ok(quote)
    }
}

impl Quote {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] when the amount is not positive,
    /// a fee is negative, or the duration is not positive.
    pub fn validate(&self) -> Result<(), HaulHubError> {
        if self.amount <= 0.0 {
            return Err(ValidationError::InvalidField {
                field: "amount",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.additional_fees.values().any(|fee| *fee < 0.0) {
            return Err(ValidationError::InvalidField {
                field: "additionalFees",
                reason: "must not be negative".to_string(),
            }
            .into());
        }
        if self.estimated_duration.is_some_and(|hours| hours <= 0.0) {
            return Err(ValidationError::InvalidField {
                field: "estimatedDuration",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Quoted amount plus every additional fee.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.amount + self.additional_fees.values().sum::<f64>()
    }

    /// Ensure the quote can be accepted at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::QuoteNotPending`] when the quote was already
    /// decided, or [`TransitionError::QuoteExpired`] past `valid_until`.
    pub fn ensure_acceptable(&self, at: Timestamp) -> Result<(), TransitionError> {
        if self.status != QuoteStatus::Pending {
            return Err(TransitionError::QuoteNotPending(self.status.to_string()));
        }
        if self.valid_until <= at {
            return Err(TransitionError::QuoteExpired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuoteDraft {
        QuoteDraft {
            business_id: Some(BusinessId::new()),
            amount: Some(175.0),
            details: Some("Removal of 3 furniture items".to_string()),
            estimated_duration: Some(2.5),
            materials_included: true,
            disposal_included: true,
            additional_fees: BTreeMap::from([
                ("disposal_fee".to_string(), 25.0),
                ("fuel_surcharge".to_string(), 10.0),
            ]),
            ..QuoteDraft::default()
        }
    }

    #[test]
    fn should_create_pending_quote_valid_for_default_days() {
        let quote = draft().into_quote(ServiceRequestId::new()).unwrap();
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!(
            quote.valid_until - quote.created_at,
            Duration::days(DEFAULT_VALID_DAYS)
        );
    }

    #[test]
    fn should_reject_validity_beyond_a_year() {
        for days in [0, MAX_VALID_DAYS + 1, 100_000_000, i64::MAX] {
            let result = QuoteDraft {
                valid_days: Some(days),
                ..draft()
            }
            .into_quote(ServiceRequestId::new());
            assert!(
                matches!(
                    result,
                    Err(HaulHubError::Validation(ValidationError::InvalidField {
                        field: "validDays",
                        ..
                    }))
                ),
                "{days}"
            );
        }
    }

    #[test]
    fn should_accept_longest_validity() {
        let quote = QuoteDraft {
            valid_days: Some(MAX_VALID_DAYS),
            ..draft()
        }
        .into_quote(ServiceRequestId::new())
        .unwrap();
        assert_eq!(
            quote.valid_until - quote.created_at,
            Duration::days(MAX_VALID_DAYS)
        );
    }

    #[test]
    fn should_sum_fees_into_total() {
        let quote = draft().into_quote(ServiceRequestId::new()).unwrap();
        assert!((quote.total() - 210.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_require_business() {
        let result = QuoteDraft {
            business_id: None,
            ..draft()
        }
        .into_quote(ServiceRequestId::new());
        assert!(matches!(
            result,
            Err(HaulHubError::Validation(ValidationError::MissingField(
                "businessId"
            )))
        ));
    }

    #[test]
    fn should_reject_non_positive_amount() {
        let result = QuoteDraft {
            amount: Some(0.0),
            ..draft()
        }
        .into_quote(ServiceRequestId::new());
        assert!(matches!(
            result,
            Err(HaulHubError::Validation(ValidationError::InvalidField {
                field: "amount",
                ..
            }))
        ));
    }

    #[test]
    fn should_refuse_accepting_decided_quote() {
        let mut quote = draft().into_quote(ServiceRequestId::new()).unwrap();
        quote.status = QuoteStatus::Rejected;
        assert_eq!(
            quote.ensure_acceptable(quote.created_at),
            Err(TransitionError::QuoteNotPending("rejected".to_string()))
        );
    }

    #[test]
    fn should_refuse_accepting_expired_quote() {
        let quote = draft().into_quote(ServiceRequestId::new()).unwrap();
        assert_eq!(
            quote.ensure_acceptable(quote.valid_until),
            Err(TransitionError::QuoteExpired)
        );
    }
}

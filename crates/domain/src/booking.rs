//! Booking: a confirmed, scheduled job created from an accepted quote.
//!
//! Status flow:
//!
//! ```text
//! confirmed ──start──▶ in_progress ──complete──▶ completed
//!     │                    │
//!     └──────cancel────────┴──▶ cancelled
//! ```

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{HaulHubError, TransitionError, ValidationError};
use crate::id::{BookingId, BusinessId, QuoteId, ServiceRequestId, UserId};
use crate::quote::Quote;
use crate::time::{Timestamp, hhmm, hhmm_opt};

/// Reason stored when a customer cancels without giving one.
pub const DEFAULT_CANCELLATION_REASON: &str = "Customer requested cancellation";

wire_enum!(
    /// Where a booking is in its lifecycle.
    BookingStatus, field = "bookingStatus", default = Confirmed {
        Confirmed => "confirmed",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

impl BookingStatus {
    /// The error reported when a booking found in `current` cannot be moved
    /// to `self`. Bookings only enter `confirmed` when they are created.
    #[must_use]
    pub fn refused_from(self, current: Self) -> TransitionError {
        match self {
            Self::InProgress => TransitionError::BookingNotConfirmed,
            Self::Completed => TransitionError::BookingNotInProgress,
            Self::Confirmed | Self::Cancelled => {
                TransitionError::BookingCannotBeCancelled(current.to_string())
            }
        }
    }
}

wire_enum!(
    /// Payment state of a booking.
    PaymentStatus, field = "paymentStatus", default = Pending {
        Pending => "pending",
        Paid => "paid",
        Refunded => "refunded",
    }
);

/// A confirmed job between a customer and a business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub reference: String,
    pub request_id: ServiceRequestId,
    pub quote_id: QuoteId,
    pub customer_user_id: UserId,
    pub business_id: BusinessId,
    pub scheduled_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub scheduled_time_start: NaiveTime,
    #[serde(default, with = "hhmm_opt")]
    pub scheduled_time_end: Option<NaiveTime>,
    pub final_amount: f64,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub actual_start_time: Option<Timestamp>,
    pub actual_end_time: Option<Timestamp>,
    pub completion_notes: Option<String>,
    pub before_photos: Vec<String>,
    pub after_photos: Vec<String>,
    pub customer_signature: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// When the job is scheduled to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
}

impl Slot {
    /// Check that the slot does not end before it starts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidField`] when `end < start`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.end {
            Some(end) if end < self.start => Err(ValidationError::InvalidField {
                field: "scheduledTimeEnd",
                reason: "must not be before scheduledTimeStart".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// What a business reports when finishing a job.
#[derive(Debug, Clone, Default)]
pub struct CompletionReport {
    pub notes: Option<String>,
    pub after_photos: Vec<String>,
    pub customer_signature: Option<String>,
}

/// Build a human-facing booking reference such as `BK-2025-004821`.
///
/// The six digits come from a fresh random UUID.
#[must_use]
pub fn generate_reference(at: Timestamp) -> String {
    let digits = uuid::Uuid::new_v4().as_u128() % 1_000_000;
    format!("BK-{}-{digits:06}", at.year())
}

impl Booking {
    /// Create a confirmed booking for `customer` from an accepted `quote`.
    ///
    /// The final amount is the quote total, fees included.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] when the slot is inconsistent.
    pub fn from_quote(
        quote: &Quote,
        customer: UserId,
        slot: Slot,
        at: Timestamp,
    ) -> Result<Self, HaulHubError> {
        slot.validate()?;
        Ok(Self {
            id: BookingId::new(),
            reference: generate_reference(at),
            request_id: quote.request_id,
            quote_id: quote.id,
            customer_user_id: customer,
            business_id: quote.business_id,
            scheduled_date: slot.date,
            scheduled_time_start: slot.start,
            scheduled_time_end: slot.end,
            final_amount: quote.total(),
            payment_status: PaymentStatus::Pending,
            booking_status: BookingStatus::Confirmed,
            cancellation_reason: None,
            actual_start_time: None,
            actual_end_time: None,
            completion_notes: None,
            before_photos: Vec::new(),
            after_photos: Vec::new(),
            customer_signature: None,
            created_at: at,
            updated_at: at,
            completed_at: None,
        })
    }

    /// Cancel the booking.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::BookingCannotBeCancelled`] when the booking
    /// is already completed or cancelled.
    pub fn cancel(&mut self, reason: Option<String>, at: Timestamp) -> Result<(), TransitionError> {
        if matches!(
            self.booking_status,
            BookingStatus::Completed | BookingStatus::Cancelled
        ) {
            return Err(TransitionError::BookingCannotBeCancelled(
                self.booking_status.to_string(),
            ));
        }
        self.booking_status = BookingStatus::Cancelled;
        self.cancellation_reason =
            Some(reason.unwrap_or_else(|| DEFAULT_CANCELLATION_REASON.to_string()));
        self.updated_at = at;
        Ok(())
    }

    /// Mark the crew as on site.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::BookingNotConfirmed`] unless confirmed.
    pub fn start(&mut self, before_photos: Vec<String>, at: Timestamp) -> Result<(), TransitionError> {
        if self.booking_status != BookingStatus::Confirmed {
            return Err(TransitionError::BookingNotConfirmed);
        }
        self.booking_status = BookingStatus::InProgress;
        self.actual_start_time = Some(at);
        self.before_photos = before_photos;
        self.updated_at = at;
        Ok(())
    }

    /// Finish the job.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::BookingNotInProgress`] unless in progress.
    pub fn complete(&mut self, report: CompletionReport, at: Timestamp) -> Result<(), TransitionError> {
        if self.booking_status != BookingStatus::InProgress {
            return Err(TransitionError::BookingNotInProgress);
        }
        self.booking_status = BookingStatus::Completed;
        self.actual_end_time = Some(at);
        self.completed_at = Some(at);
        self.completion_notes = report.notes;
        self.after_photos = report.after_photos;
        self.customer_signature = report.customer_signature;
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::QuoteDraft;
    use crate::time::now;

    fn slot() -> Slot {
        Slot {
            date: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(12, 0, 0),
        }
    }

    fn booking() -> Booking {
        let quote = QuoteDraft {
            business_id: Some(BusinessId::new()),
            amount: Some(175.0),
            ..QuoteDraft::default()
        }
        .into_quote(ServiceRequestId::new())
        .unwrap();
        Booking::from_quote(&quote, UserId::new("user_123"), slot(), now()).unwrap()
    }

    #[test]
    fn should_start_confirmed_with_pending_payment() {
        let booking = booking();
        assert_eq!(booking.booking_status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert!((booking.final_amount - 175.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_format_reference_with_year_and_six_digits() {
        let at = chrono::DateTime::parse_from_rfc3339("2025-09-15T10:00:00Z")
            .unwrap()
            .to_utc();
        let reference = generate_reference(at);
        assert!(reference.starts_with("BK-2025-"));
        let digits = reference.trim_start_matches("BK-2025-");
        assert_eq!(digits.len(), 6);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn should_reject_slot_ending_before_start() {
        let bad = Slot {
            end: NaiveTime::from_hms_opt(9, 0, 0),
            ..slot()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn should_cancel_with_default_reason() {
        let mut booking = booking();
        booking.cancel(None, now()).unwrap();
        assert_eq!(booking.booking_status, BookingStatus::Cancelled);
        assert_eq!(
            booking.cancellation_reason.as_deref(),
            Some(DEFAULT_CANCELLATION_REASON)
        );
    }

    #[test]
    fn should_refuse_cancelling_twice() {
        let mut booking = booking();
        booking.cancel(Some("moved".to_string()), now()).unwrap();
        let err = booking.cancel(None, now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Booking with status cancelled cannot be cancelled"
        );
    }

    #[test]
    fn should_refuse_cancelling_completed_booking() {
        let mut booking = booking();
        booking.start(vec![], now()).unwrap();
        booking.complete(CompletionReport::default(), now()).unwrap();
        assert_eq!(
            booking.cancel(None, now()),
            Err(TransitionError::BookingCannotBeCancelled(
                "completed".to_string()
            ))
        );
    }

    #[test]
    fn should_refuse_completing_confirmed_booking() {
        let mut booking = booking();
        assert_eq!(
            booking.complete(CompletionReport::default(), now()),
            Err(TransitionError::BookingNotInProgress)
        );
    }

    #[test]
    fn should_record_completion_report() {
        let mut booking = booking();
        booking
            .start(vec!["https://example.com/before1.jpg".to_string()], now())
            .unwrap();
        booking
            .complete(
                CompletionReport {
                    notes: Some("All items removed".to_string()),
                    after_photos: vec!["https://example.com/after1.jpg".to_string()],
                    customer_signature: Some("J. Doe".to_string()),
                },
                now(),
            )
            .unwrap();

        assert_eq!(booking.booking_status, BookingStatus::Completed);
        assert!(booking.actual_start_time.is_some());
        assert!(booking.completed_at.is_some());
        assert_eq!(booking.after_photos.len(), 1);
        assert_eq!(booking.before_photos.len(), 1);
    }

    #[test]
    fn should_serialize_status_in_snake_case() {
        let json = serde_json::to_value(booking()).unwrap();
        assert_eq!(json["bookingStatus"], "confirmed");
        assert_eq!(json["scheduledTimeStart"], "10:00");
        assert_eq!(json["scheduledDate"], "2025-10-20");
        assert_eq!(
            serde_json::to_value(BookingStatus::InProgress).unwrap(),
            "in_progress"
        );
    }

    #[test]
    fn should_name_refused_move_after_current_status() {
        assert_eq!(
            BookingStatus::Cancelled.refused_from(BookingStatus::Completed),
            TransitionError::BookingCannotBeCancelled("completed".to_string())
        );
        assert_eq!(
            BookingStatus::Completed.refused_from(BookingStatus::Cancelled),
            TransitionError::BookingNotInProgress
        );
        assert_eq!(
            BookingStatus::InProgress.refused_from(BookingStatus::Completed),
            TransitionError::BookingNotConfirmed
        );
    }
}

//! Booking repository port.

use std::future::Future;

use haulhub_domain::booking::{Booking, BookingStatus};
use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::{BookingId, UserId};
use haulhub_domain::pagination::{Page, Window};

/// Repository for persisting and querying [`Booking`]s.
pub trait BookingRepository {
    /// Persist a booking created from an accepted quote, as one unit of work:
    ///
    /// - insert `booking`
    /// - mark its quote `accepted`
    /// - mark every other pending quote on the same request `rejected`
    /// - mark the request `booked`
    ///
    /// Nothing is written if any step fails.
    fn accept_quote(
        &self,
        booking: Booking,
    ) -> impl Future<Output = Result<Booking, HaulHubError>> + Send;

    /// Get a booking by its unique identifier.
    fn get_by_id(
        &self,
        id: BookingId,
    ) -> impl Future<Output = Result<Option<Booking>, HaulHubError>> + Send;

    /// A customer's bookings, newest first, optionally filtered by status.
    fn list_for_customer(
        &self,
        customer: &UserId,
        status: Option<BookingStatus>,
        window: Window,
    ) -> impl Future<Output = Result<Page<Booking>, HaulHubError>> + Send;

    /// Overwrite the mutable fields of an existing booking, provided it is
    /// still stored with status `from`.
    ///
    /// A booking that moved on since it was read is left untouched and
    /// reported as the [`TransitionError`](haulhub_domain::error::TransitionError)
    /// its current status calls for.
    fn update(
        &self,
        booking: Booking,
        from: BookingStatus,
    ) -> impl Future<Output = Result<Booking, HaulHubError>> + Send;
}

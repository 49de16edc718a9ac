//! Booking service: accepting quotes and driving bookings through their
//! lifecycle.

use haulhub_domain::booking::{Booking, BookingStatus, CompletionReport, Slot};
use haulhub_domain::error::{Entity, HaulHubError, NotFoundError};
use haulhub_domain::id::{BookingId, QuoteId, UserId};
use haulhub_domain::pagination::{Page, Window};
use haulhub_domain::time::now;

use crate::ports::{BookingRepository, QuoteRepository, ServiceRequestRepository};

/// Application service for bookings.
pub struct BookingService<BR, QR, RR> {
    bookings: BR,
    quotes: QR,
    requests: RR,
}

impl<BR, QR, RR> BookingService<BR, QR, RR>
where
    BR: BookingRepository,
    QR: QuoteRepository,
    RR: ServiceRequestRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(bookings: BR, quotes: QR, requests: RR) -> Self {
        Self {
            bookings,
            quotes,
            requests,
        }
    }

    /// Accept a quote and book the job for the request's customer.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when the quote or its request does
    /// not exist, [`HaulHubError::Transition`] when the quote is not pending,
    /// has expired, or the request is no longer open,
    /// [`HaulHubError::Validation`] for an inconsistent slot, or a storage
    /// error from a repository.
    #[tracing::instrument(skip(self))]
    pub async fn accept_quote(&self, quote_id: QuoteId, slot: Slot) -> Result<Booking, HaulHubError> {
        let at = now();
        let quote = self.quotes.get_by_id(quote_id).await?.ok_or_else(|| NotFoundError {
            entity: Entity::Quote,
            id: quote_id.to_string(),
        })?;
        quote.ensure_acceptable(at)?;

        let request = self
            .requests
            .get_by_id(quote.request_id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: Entity::ServiceRequest,
                id: quote.request_id.to_string(),
            })?;
        request.ensure_open(at)?;

        let booking = Booking::from_quote(&quote, request.customer_user_id, slot, at)?;
        let booking = self.bookings.accept_quote(booking).await?;
        tracing::info!(booking_id = %booking.id, reference = %booking.reference, "quote accepted");
        Ok(booking)
    }

    /// A customer's bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn history(
        &self,
        customer: &UserId,
        status: Option<BookingStatus>,
        window: Window,
    ) -> Result<Page<Booking>, HaulHubError> {
        self.bookings
            .list_for_customer(customer, status, window)
            .await
    }

    /// Look up a booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when no booking with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, HaulHubError> {
        self.bookings.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: Entity::Booking,
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Cancel one of `customer`'s bookings. Bookings of other customers are
    /// reported as not found.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when the customer has no such
    /// booking, [`HaulHubError::Transition`] when it is already completed or
    /// cancelled, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(
        &self,
        id: BookingId,
        customer: &UserId,
        reason: Option<String>,
    ) -> Result<Booking, HaulHubError> {
        let mut booking = self.get_booking(id).await?;
        if &booking.customer_user_id != customer {
            return Err(NotFoundError {
                entity: Entity::Booking,
                id: id.to_string(),
            }
            .into());
        }
        let from = booking.booking_status;
        booking.cancel(reason, now())?;
        let booking = self.bookings.update(booking, from).await?;
        tracing::info!("booking cancelled");
        Ok(booking)
    }

    /// Mark a confirmed booking as in progress.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when the booking does not exist,
    /// [`HaulHubError::Transition`] unless it is confirmed, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, before_photos))]
    pub async fn start(
        &self,
        id: BookingId,
        before_photos: Vec<String>,
    ) -> Result<Booking, HaulHubError> {
        let mut booking = self.get_booking(id).await?;
        let from = booking.booking_status;
        booking.start(before_photos, now())?;
        self.bookings.update(booking, from).await
    }

    /// Complete a booking that is in progress.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when the booking does not exist,
    /// [`HaulHubError::Transition`] unless it is in progress, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, report))]
    pub async fn complete(
        &self,
        id: BookingId,
        report: CompletionReport,
    ) -> Result<Booking, HaulHubError> {
        let mut booking = self.get_booking(id).await?;
        let from = booking.booking_status;
        booking.complete(report, now())?;
        let booking = self.bookings.update(booking, from).await?;
        tracing::info!("booking completed");
        Ok(booking)
    }
}

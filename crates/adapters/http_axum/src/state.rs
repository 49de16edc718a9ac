//! Shared application state for axum handlers.

use std::sync::Arc;

use haulhub_app::ports::{
    BookingRepository, BusinessRepository, QuoteRepository, ReviewRepository,
    ScheduleRepository, ServiceRequestRepository, SubscriptionRepository,
};
use haulhub_app::services::booking_service::BookingService;
use haulhub_app::services::business_service::BusinessService;
use haulhub_app::services::request_service::RequestService;
use haulhub_app::services::schedule_service::ScheduleService;

/// The set of repository implementations the API runs on.
///
/// Handlers are generic over this one parameter instead of one type
/// parameter per repository.
pub trait Repositories: Send + Sync + 'static {
    type Requests: ServiceRequestRepository + Send + Sync + 'static;
    type Quotes: QuoteRepository + Send + Sync + 'static;
    type Bookings: BookingRepository + Send + Sync + 'static;
    type Businesses: BusinessRepository + Send + Sync + 'static;
    type Reviews: ReviewRepository + Send + Sync + 'static;
    type Schedules: ScheduleRepository + Send + Sync + 'static;
    type Subscriptions: SubscriptionRepository + Send + Sync + 'static;
}

pub type RequestServiceOf<R> = RequestService<
    <R as Repositories>::Requests,
    <R as Repositories>::Quotes,
    <R as Repositories>::Businesses,
>;

pub type BookingServiceOf<R> = BookingService<
    <R as Repositories>::Bookings,
    <R as Repositories>::Quotes,
    <R as Repositories>::Requests,
>;

pub type BusinessServiceOf<R> =
    BusinessService<<R as Repositories>::Businesses, <R as Repositories>::Reviews>;

pub type ScheduleServiceOf<R> =
    ScheduleService<<R as Repositories>::Schedules, <R as Repositories>::Subscriptions>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the repositories themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<R: Repositories> {
    /// Service requests and their quotes.
    pub request_service: Arc<RequestServiceOf<R>>,
    /// Quote acceptance and the booking lifecycle.
    pub booking_service: Arc<BookingServiceOf<R>>,
    /// Search, profiles and reviews.
    pub business_service: Arc<BusinessServiceOf<R>>,
    /// Pickup schedules and subscriptions.
    pub schedule_service: Arc<ScheduleServiceOf<R>>,
}

impl<R: Repositories> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            request_service: Arc::clone(&self.request_service),
            booking_service: Arc::clone(&self.booking_service),
            business_service: Arc::clone(&self.business_service),
            schedule_service: Arc::clone(&self.schedule_service),
        }
    }
}

impl<R: Repositories> AppState<R> {
    /// Create a new application state from service instances.
    pub fn new(
        request_service: RequestServiceOf<R>,
        booking_service: BookingServiceOf<R>,
        business_service: BusinessServiceOf<R>,
        schedule_service: ScheduleServiceOf<R>,
    ) -> Self {
        Self {
            request_service: Arc::new(request_service),
            booking_service: Arc::new(booking_service),
            business_service: Arc::new(business_service),
            schedule_service: Arc::new(schedule_service),
        }
    }
}

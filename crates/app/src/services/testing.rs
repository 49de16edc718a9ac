//! In-memory implementation of every port, shared by service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use haulhub_domain::booking::{Booking, BookingStatus};
use haulhub_domain::business::Business;
use haulhub_domain::error::{Entity, HaulHubError, NotFoundError};
use haulhub_domain::id::{
    BookingId, BusinessId, QuoteId, ScheduleId, ServiceRequestId, SubscriptionId, UserId,
};
use haulhub_domain::pagination::{Page, Window};
use haulhub_domain::quote::{Quote, QuoteStatus};
use haulhub_domain::review::Review;
use haulhub_domain::schedule::PickupSchedule;
use haulhub_domain::service_request::ServiceRequest;
use haulhub_domain::subscription::Subscription;

use crate::ports::{
    BookingRepository, BusinessRepository, QuoteRepository, ReviewRepository, ScheduleRepository,
    ServiceRequestRepository, SubscriptionRepository,
};

#[derive(Default)]
struct State {
    requests: HashMap<ServiceRequestId, ServiceRequest>,
    quotes: Vec<Quote>,
    bookings: Vec<Booking>,
    businesses: HashMap<BusinessId, Business>,
    reviews: Vec<Review>,
    schedules: Vec<PickupSchedule>,
    subscriptions: Vec<Subscription>,
}

/// Cloneable handle; clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn business(&self, id: BusinessId) -> Option<Business> {
        self.state.lock().unwrap().businesses.get(&id).cloned()
    }

    pub fn quote(&self, id: QuoteId) -> Option<Quote> {
        self.state
            .lock()
            .unwrap()
            .quotes
            .iter()
            .find(|q| q.id == id)
            .cloned()
    }
}

impl ServiceRequestRepository for InMemoryStore {
    fn create(
        &self,
        request: ServiceRequest,
    ) -> impl Future<Output = Result<ServiceRequest, HaulHubError>> + Send {
        let mut state = self.state.lock().unwrap();
        state.requests.insert(request.id, request.clone());
        async { Ok(request) }
    }

    fn get_by_id(
        &self,
        id: ServiceRequestId,
    ) -> impl Future<Output = Result<Option<ServiceRequest>, HaulHubError>> + Send {
        let result = self.state.lock().unwrap().requests.get(&id).cloned();
        async { Ok(result) }
    }
}

impl QuoteRepository for InMemoryStore {
    fn create(&self, quote: Quote) -> impl Future<Output = Result<Quote, HaulHubError>> + Send {
        self.state.lock().unwrap().quotes.push(quote.clone());
        async { Ok(quote) }
    }

    fn get_by_id(
        &self,
        id: QuoteId,
    ) -> impl Future<Output = Result<Option<Quote>, HaulHubError>> + Send {
        let result = self.quote(id);
        async { Ok(result) }
    }

    fn list_for_request(
        &self,
        request_id: ServiceRequestId,
    ) -> impl Future<Output = Result<Vec<Quote>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let result: Vec<Quote> = state
            .quotes
            .iter()
            .filter(|q| q.request_id == request_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }
}

impl BookingRepository for InMemoryStore {
    fn accept_quote(
        &self,
        booking: Booking,
    ) -> impl Future<Output = Result<Booking, HaulHubError>> + Send {
        let mut state = self.state.lock().unwrap();
        for quote in &mut state.quotes {
            if quote.id == booking.quote_id {
                quote.status = QuoteStatus::Accepted;
            } else if quote.request_id == booking.request_id && quote.status == QuoteStatus::Pending
            {
                quote.status = QuoteStatus::Rejected;
            }
        }
        if let Some(request) = state.requests.get_mut(&booking.request_id) {
            request.mark_booked(booking.created_at);
        }
        state.bookings.push(booking.clone());
        async { Ok(booking) }
    }

    fn get_by_id(
        &self,
        id: BookingId,
    ) -> impl Future<Output = Result<Option<Booking>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let result = state.bookings.iter().find(|b| b.id == id).cloned();
        async { Ok(result) }
    }

    fn list_for_customer(
        &self,
        customer: &UserId,
        status: Option<BookingStatus>,
        window: Window,
    ) -> impl Future<Output = Result<Page<Booking>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| &b.customer_user_id == customer)
            .filter(|b| status.is_none_or(|s| b.booking_status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        let page = Page::new(window.apply(matching), total);
        async { Ok(page) }
    }

    fn update(
        &self,
        booking: Booking,
        from: BookingStatus,
    ) -> impl Future<Output = Result<Booking, HaulHubError>> + Send {
        let mut state = self.state.lock().unwrap();
        let result = match state.bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(slot) if slot.booking_status == from => {
                *slot = booking.clone();
                Ok(booking)
            }
            Some(slot) => Err(booking.booking_status.refused_from(slot.booking_status).into()),
            None => Err(NotFoundError {
                entity: Entity::Booking,
                id: booking.id.to_string(),
            }
            .into()),
        };
        async { result }
    }
}

impl BusinessRepository for InMemoryStore {
    fn get_by_id(
        &self,
        id: BusinessId,
    ) -> impl Future<Output = Result<Option<Business>, HaulHubError>> + Send {
        let result = self.business(id);
        async { Ok(result) }
    }

    fn find_by_user(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<Business>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let result = state
            .businesses
            .values()
            .find(|b| &b.user_id == user)
            .cloned();
        async { Ok(result) }
    }

    fn list_active(&self) -> impl Future<Output = Result<Vec<Business>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let result: Vec<Business> = state
            .businesses
            .values()
            .filter(|b| b.is_active)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn upsert(
        &self,
        business: Business,
    ) -> impl Future<Output = Result<Business, HaulHubError>> + Send {
        let mut state = self.state.lock().unwrap();
        state.businesses.insert(business.id, business.clone());
        async { Ok(business) }
    }
}

impl ReviewRepository for InMemoryStore {
    fn create(&self, review: Review) -> impl Future<Output = Result<Review, HaulHubError>> + Send {
        let mut state = self.state.lock().unwrap();
        if let Some(business) = state.businesses.get_mut(&review.business_id) {
            let rating = business.rating_summary().with(review.rating);
            business.rating = rating.average;
            business.rating_count = rating.count;
        }
        state.reviews.push(review.clone());
        async { Ok(review) }
    }

    fn list_public(
        &self,
        business_id: BusinessId,
        window: Window,
    ) -> impl Future<Output = Result<Page<Review>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.business_id == business_id && r.is_public)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        let page = Page::new(window.apply(matching), total);
        async { Ok(page) }
    }
}

impl ScheduleRepository for InMemoryStore {
    fn create(
        &self,
        schedule: PickupSchedule,
    ) -> impl Future<Output = Result<PickupSchedule, HaulHubError>> + Send {
        self.state.lock().unwrap().schedules.push(schedule.clone());
        async { Ok(schedule) }
    }

    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<PickupSchedule>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let result = state.schedules.iter().find(|s| s.id == id).cloned();
        async { Ok(result) }
    }

    fn list_active(
        &self,
    ) -> impl Future<Output = Result<Vec<PickupSchedule>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let result: Vec<PickupSchedule> =
            state.schedules.iter().filter(|s| s.is_active).cloned().collect();
        async { Ok(result) }
    }
}

impl SubscriptionRepository for InMemoryStore {
    fn create(
        &self,
        subscription: Subscription,
    ) -> impl Future<Output = Result<Subscription, HaulHubError>> + Send {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .push(subscription.clone());
        async { Ok(subscription) }
    }

    fn list_active_for_user(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Subscription>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let result: Vec<Subscription> = state
            .subscriptions
            .iter()
            .filter(|s| &s.user_id == user && s.is_active)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn find_for_user(
        &self,
        id: SubscriptionId,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<Subscription>, HaulHubError>> + Send {
        let state = self.state.lock().unwrap();
        let result = state
            .subscriptions
            .iter()
            .find(|s| s.id == id && &s.user_id == user)
            .cloned();
        async { Ok(result) }
    }

    fn delete(&self, id: SubscriptionId) -> impl Future<Output = Result<(), HaulHubError>> + Send {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .retain(|s| s.id != id);
        async { Ok(()) }
    }
}

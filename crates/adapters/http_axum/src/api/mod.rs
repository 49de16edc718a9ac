//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod bookings;
#[allow(clippy::missing_errors_doc)]
pub mod businesses;
#[allow(clippy::missing_errors_doc)]
pub mod schedules;

use axum::Router;
use axum::routing::{delete, get, post};

use crate::state::{AppState, Repositories};

/// Build the `/api` sub-router.
pub fn routes<R: Repositories>() -> Router<AppState<R>> {
    Router::new()
        // Service requests and quotes
        .route("/bookings/requests", post(bookings::create_request::<R>))
        .route("/bookings/requests/{id}", get(bookings::get_request::<R>))
        .route(
            "/bookings/requests/{id}/quotes",
            get(bookings::list_quotes::<R>).post(bookings::submit_quote::<R>),
        )
        .route(
            "/bookings/quotes/{id}/accept",
            post(bookings::accept_quote::<R>),
        )
        // Bookings
        .route("/bookings/history", get(bookings::history::<R>))
        .route("/bookings/{id}", get(bookings::get_booking::<R>))
        .route("/bookings/{id}/cancel", post(bookings::cancel::<R>))
        .route("/bookings/{id}/start", post(bookings::start::<R>))
        .route("/bookings/{id}/complete", post(bookings::complete::<R>))
        // Businesses
        .route("/businesses/search", get(businesses::search::<R>))
        .route(
            "/businesses/profile",
            get(businesses::own_profile::<R>).post(businesses::upsert_profile::<R>),
        )
        .route("/businesses/{id}", get(businesses::get_profile::<R>))
        .route(
            "/businesses/{id}/reviews",
            get(businesses::list_reviews::<R>).post(businesses::create_review::<R>),
        )
        // Schedules
        .route(
            "/schedules",
            get(schedules::list::<R>).post(schedules::create::<R>),
        )
        .route("/schedules/lookup", get(schedules::lookup::<R>))
        .route(
            "/schedules/subscriptions",
            get(schedules::subscriptions::<R>).post(schedules::subscribe::<R>),
        )
        .route(
            "/schedules/subscriptions/{id}",
            delete(schedules::unsubscribe::<R>),
        )
        .route("/schedules/{id}/events", get(schedules::events::<R>))
}

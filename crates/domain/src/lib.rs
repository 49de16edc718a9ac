//! # haulhub-domain
//!
//! Pure domain model for the haulhub local-services marketplace.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps,
//!   date/time parsing, pagination
//! - Define **Service requests** (customer job descriptions awaiting quotes)
//! - Define **Quotes** (a business's priced offer against a request)
//! - Define **Bookings** (confirmed jobs) and their status transitions
//! - Define **Businesses**, their service offerings and **Reviews**
//! - Define **Pickup schedules**, zones, recurrence and **Subscriptions**
//! - In-memory business search (filter, distance, sort, page)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

#[macro_use]
mod macros;

pub mod error;
pub mod geo;
pub mod id;
pub mod pagination;
pub mod time;

pub mod booking;
pub mod business;
pub mod quote;
pub mod review;
pub mod schedule;
pub mod search;
pub mod service_request;
pub mod subscription;

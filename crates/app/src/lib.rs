//! # haulhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ServiceRequestRepository`, `QuoteRepository`, `BookingRepository`
//!   - `BusinessRepository`, `ReviewRepository`
//!   - `ScheduleRepository`, `SubscriptionRepository`
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RequestService`: service requests and the quotes on them
//!   - `BookingService`: accepting quotes and the booking lifecycle
//!   - `BusinessService`: search, profiles and reviews
//!   - `ScheduleService`: pickup schedules, events and subscriptions
//! - Orchestrate domain objects without knowing *how* persistence works
//!
//! ## Dependency rule
//! Depends on `haulhub-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;

//! # haulhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **JSON REST API** under `/api` (`/api/bookings`,
//!   `/api/businesses`, `/api/schedules`)
//! - Wrap every response in the `{success, data|error, message?, timestamp,
//!   requestId}` envelope
//! - Resolve the acting user from the `X-User-Id` header
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map domain errors into status codes and stable error codes
//!
//! ## Dependency rule
//! Depends on `haulhub-app` (for port traits and services) and `haulhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod router;
pub mod state;

//! # haulhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `haulhub-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Run multi-row writes (quote acceptance, reviews, profile and schedule
//!   saves) inside a single transaction
//!
//! ## Dependency rule
//! Depends on `haulhub-app` (for port traits) and `haulhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod codec;
pub mod error;
pub mod pool;

mod booking_repo;
mod business_repo;
mod quote_repo;
mod request_repo;
mod review_repo;
mod schedule_repo;
mod subscription_repo;

pub use booking_repo::SqliteBookingRepository;
pub use business_repo::SqliteBusinessRepository;
pub use pool::{Config, Database};
pub use quote_repo::SqliteQuoteRepository;
pub use request_repo::SqliteServiceRequestRepository;
pub use review_repo::SqliteReviewRepository;
pub use schedule_repo::SqliteScheduleRepository;
pub use subscription_repo::SqliteSubscriptionRepository;

//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod booking_repo;
pub mod business_repo;
pub mod quote_repo;
pub mod request_repo;
pub mod review_repo;
pub mod schedule_repo;
pub mod subscription_repo;

pub use booking_repo::BookingRepository;
pub use business_repo::BusinessRepository;
pub use quote_repo::QuoteRepository;
pub use request_repo::ServiceRequestRepository;
pub use review_repo::ReviewRepository;
pub use schedule_repo::ScheduleRepository;
pub use subscription_repo::SubscriptionRepository;

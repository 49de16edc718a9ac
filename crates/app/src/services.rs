//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod booking_service;
pub mod business_service;
pub mod request_service;
pub mod schedule_service;

#[cfg(test)]
pub(crate) mod testing;

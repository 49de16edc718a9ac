//! Business repository port.

use std::future::Future;

use haulhub_domain::business::Business;
use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::{BusinessId, UserId};

/// Repository for persisting and querying [`Business`] profiles.
pub trait BusinessRepository {
    /// Get a business by its unique identifier, offerings and photos included.
    fn get_by_id(
        &self,
        id: BusinessId,
    ) -> impl Future<Output = Result<Option<Business>, HaulHubError>> + Send;

    /// The business owned by `user`, if any.
    fn find_by_user(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<Business>, HaulHubError>> + Send;

    /// Every active business.
    fn list_active(&self) -> impl Future<Output = Result<Vec<Business>, HaulHubError>> + Send;

    /// Insert or update a business; its offerings are replaced wholesale.
    fn upsert(
        &self,
        business: Business,
    ) -> impl Future<Output = Result<Business, HaulHubError>> + Send;
}

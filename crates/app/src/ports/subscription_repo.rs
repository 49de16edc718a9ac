//! Schedule subscription repository port.

use std::future::Future;

use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::{SubscriptionId, UserId};
use haulhub_domain::subscription::Subscription;

/// Repository for persisting and querying [`Subscription`]s.
pub trait SubscriptionRepository {
    /// Create a new subscription in storage.
    fn create(
        &self,
        subscription: Subscription,
    ) -> impl Future<Output = Result<Subscription, HaulHubError>> + Send;

    /// Active subscriptions of `user`, oldest first.
    fn list_active_for_user(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Subscription>, HaulHubError>> + Send;

    /// A subscription by id, only if it belongs to `user`.
    fn find_for_user(
        &self,
        id: SubscriptionId,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<Subscription>, HaulHubError>> + Send;

    /// Delete a subscription by id.
    fn delete(&self, id: SubscriptionId) -> impl Future<Output = Result<(), HaulHubError>> + Send;
}

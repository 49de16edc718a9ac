//! Review repository port.

use std::future::Future;

use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::BusinessId;
use haulhub_domain::pagination::{Page, Window};
use haulhub_domain::review::Review;

/// Repository for persisting and querying [`Review`]s.
pub trait ReviewRepository {
    /// Insert `review` and fold its rating into the business's average and
    /// count, in one unit of work.
    fn create(&self, review: Review) -> impl Future<Output = Result<Review, HaulHubError>> + Send;

    /// Public reviews of a business, newest first.
    fn list_public(
        &self,
        business_id: BusinessId,
        window: Window,
    ) -> impl Future<Output = Result<Page<Review>, HaulHubError>> + Send;
}

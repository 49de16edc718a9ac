//! Quote repository port.

use std::future::Future;

use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::{QuoteId, ServiceRequestId};
use haulhub_domain::quote::Quote;

/// Repository for persisting and querying [`Quote`]s.
pub trait QuoteRepository {
    /// Create a new quote in storage.
    fn create(&self, quote: Quote) -> impl Future<Output = Result<Quote, HaulHubError>> + Send;

    /// Get a quote by its unique identifier.
    fn get_by_id(
        &self,
        id: QuoteId,
    ) -> impl Future<Output = Result<Option<Quote>, HaulHubError>> + Send;

    /// Quotes placed on a request, oldest first.
    fn list_for_request(
        &self,
        request_id: ServiceRequestId,
    ) -> impl Future<Output = Result<Vec<Quote>, HaulHubError>> + Send;
}

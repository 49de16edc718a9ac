//! Service request repository port.

use std::future::Future;

use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::ServiceRequestId;
use haulhub_domain::service_request::ServiceRequest;

/// Repository for persisting and querying [`ServiceRequest`]s.
pub trait ServiceRequestRepository {
    /// Create a new service request in storage.
    fn create(
        &self,
        request: ServiceRequest,
    ) -> impl Future<Output = Result<ServiceRequest, HaulHubError>> + Send;

    /// Get a service request by its unique identifier.
    fn get_by_id(
        &self,
        id: ServiceRequestId,
    ) -> impl Future<Output = Result<Option<ServiceRequest>, HaulHubError>> + Send;
}

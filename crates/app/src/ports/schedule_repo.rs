//! Pickup schedule repository port.

use std::future::Future;

use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::ScheduleId;
use haulhub_domain::schedule::PickupSchedule;

/// Repository for persisting and querying [`PickupSchedule`]s with their zones.
pub trait ScheduleRepository {
    /// Create a schedule and its zones.
    fn create(
        &self,
        schedule: PickupSchedule,
    ) -> impl Future<Output = Result<PickupSchedule, HaulHubError>> + Send;

    /// Get a schedule by its unique identifier.
    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<PickupSchedule>, HaulHubError>> + Send;

    /// Every active schedule.
    fn list_active(
        &self,
    ) -> impl Future<Output = Result<Vec<PickupSchedule>, HaulHubError>> + Send;
}

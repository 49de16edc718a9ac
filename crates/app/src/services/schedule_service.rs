//! Schedule service: pickup schedules, generated events and subscriptions.

use chrono::{Days, NaiveDate};
use haulhub_domain::error::{Entity, HaulHubError, NotFoundError};
use haulhub_domain::id::{ScheduleId, SubscriptionId, UserId};
use haulhub_domain::schedule::{self, LocationQuery, PickupEvent, PickupSchedule, ScheduleMatch};
use haulhub_domain::subscription::{NotificationPreferences, Subscription};
use haulhub_domain::time::today;

use crate::ports::{ScheduleRepository, SubscriptionRepository};

/// Days covered by an events query that gives no end date.
pub const DEFAULT_EVENT_WINDOW_DAYS: u64 = 90;

/// Application service for pickup schedules and subscriptions.
pub struct ScheduleService<SR, UR> {
    schedules: SR,
    subscriptions: UR,
}

impl<SR, UR> ScheduleService<SR, UR>
where
    SR: ScheduleRepository,
    UR: SubscriptionRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(schedules: SR, subscriptions: UR) -> Self {
        Self {
            schedules,
            subscriptions,
        }
    }

    /// Schedules whose zones serve the given location.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, query: LocationQuery) -> Result<Vec<ScheduleMatch>, HaulHubError> {
        let schedules = self.schedules.list_active().await?;
        Ok(schedule::lookup(&schedules, &query, today()))
    }

    /// Look up a schedule by id.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when no schedule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_schedule(&self, id: ScheduleId) -> Result<PickupSchedule, HaulHubError> {
        self.schedules.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: Entity::Schedule,
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Upcoming pickups of a schedule, across all its zones.
    ///
    /// The window starts today and spans [`DEFAULT_EVENT_WINDOW_DAYS`] unless
    /// bounds are given.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when the schedule does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn events(
        &self,
        id: ScheduleId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<PickupEvent>, HaulHubError> {
        let schedule = self.get_schedule(id).await?;
        let from = start.unwrap_or_else(today);
        let to = end.unwrap_or_else(|| {
            from.checked_add_days(Days::new(DEFAULT_EVENT_WINDOW_DAYS))
                .unwrap_or(NaiveDate::MAX)
        });
        Ok(schedule.events(from, to, limit))
    }

    /// Every active schedule.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_schedules(&self) -> Result<Vec<PickupSchedule>, HaulHubError> {
        self.schedules.list_active().await
    }

    /// Create a schedule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, schedule), fields(schedule_name = %schedule.name))]
    pub async fn create_schedule(
        &self,
        schedule: PickupSchedule,
    ) -> Result<PickupSchedule, HaulHubError> {
        schedule.validate()?;
        let schedule = self.schedules.create(schedule).await?;
        tracing::info!(schedule_id = %schedule.id, zones = schedule.zones.len(), "schedule created");
        Ok(schedule)
    }

    /// Subscribe `user` to a schedule for one of their addresses.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when the schedule does not exist,
    /// [`HaulHubError::Validation`] for a blank address, or a storage error
    /// from a repository.
    #[tracing::instrument(skip(self, preferences))]
    pub async fn subscribe(
        &self,
        user: &UserId,
        schedule_id: ScheduleId,
        address_id: String,
        preferences: Option<NotificationPreferences>,
    ) -> Result<Subscription, HaulHubError> {
        self.get_schedule(schedule_id).await?;
        let subscription = Subscription::new(user.clone(), address_id, schedule_id, preferences)?;
        self.subscriptions.create(subscription).await
    }

    /// Active subscriptions of `user`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_subscriptions(&self, user: &UserId) -> Result<Vec<Subscription>, HaulHubError> {
        self.subscriptions.list_active_for_user(user).await
    }

    /// Delete one of `user`'s subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when `user` has no such
    /// subscription, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn unsubscribe(&self, id: SubscriptionId, user: &UserId) -> Result<(), HaulHubError> {
        if self.subscriptions.find_for_user(id, user).await?.is_none() {
            return Err(NotFoundError {
                entity: Entity::Subscription,
                id: id.to_string(),
            }
            .into());
        }
        self.subscriptions.delete(id).await?;
        tracing::info!("subscription deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::InMemoryStore;
    use haulhub_domain::error::ValidationError;
    use haulhub_domain::schedule::{Frequency, PickupDay, ScheduleZone};
    use haulhub_domain::time::parse_date;

    type Service = ScheduleService<InMemoryStore, InMemoryStore>;

    fn make_service() -> Service {
        let store = InMemoryStore::default();
        ScheduleService::new(store.clone(), store)
    }

    fn user() -> UserId {
        UserId::new("user_123")
    }

    fn springfield() -> PickupSchedule {
        let mut schedule = PickupSchedule::new(
            "springfield",
            "Springfield Yard Waste",
            "yard_waste",
            Frequency::Weekly,
            parse_date("2025-01-01").unwrap(),
        );
        schedule.zones = vec![
            ScheduleZone::new("Zone A", PickupDay::Friday).with_zip_codes(vec!["62704".to_string()]),
        ];
        schedule
    }

    #[tokio::test]
    async fn should_create_and_list_schedules() {
        let svc = make_service();
        svc.create_schedule(springfield()).await.unwrap();

        let all = svc.list_schedules().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].zones.len(), 1);
    }

    #[tokio::test]
    async fn should_reject_schedule_with_blank_name() {
        let svc = make_service();
        let mut schedule = springfield();
        schedule.name = "  ".to_string();
        let result = svc.create_schedule(schedule).await;
        assert!(matches!(
            result,
            Err(HaulHubError::Validation(ValidationError::MissingField("schedule_name")))
        ));
    }

    #[tokio::test]
    async fn should_look_up_schedule_by_zip() {
        let svc = make_service();
        svc.create_schedule(springfield()).await.unwrap();

        let query = LocationQuery::new(Some("1 Elm St, Springfield, IL 62704"), None, None, None)
            .unwrap();
        let found = svc.lookup(query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Springfield Yard Waste");
        assert!(found[0].next_pickup_date.is_some());

        let elsewhere = LocationQuery::new(None, None, None, Some("10001")).unwrap();
        assert!(svc.lookup(elsewhere).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_generate_events_in_window() {
        let svc = make_service();
        let schedule = svc.create_schedule(springfield()).await.unwrap();

        let events = svc
            .events(
                schedule.id,
                Some(parse_date("2025-10-01").unwrap()),
                Some(parse_date("2025-10-31").unwrap()),
                20,
            )
            .await
            .unwrap();
        let dates: Vec<String> = events.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, ["2025-10-03", "2025-10-10", "2025-10-17", "2025-10-24", "2025-10-31"]);
    }

    #[tokio::test]
    async fn should_default_events_window_to_next_ninety_days() {
        let svc = make_service();
        let schedule = svc.create_schedule(springfield()).await.unwrap();

        let events = svc.events(schedule.id, None, None, 100).await.unwrap();
        assert!((12..=13).contains(&events.len()), "got {}", events.len());
        assert!(events.iter().all(|e| e.date >= today()));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_schedule_events() {
        let svc = make_service();
        let result = svc.events(ScheduleId::new(), None, None, 20).await;
        assert!(matches!(result, Err(HaulHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_subscribe_list_and_unsubscribe() {
        let svc = make_service();
        let schedule = svc.create_schedule(springfield()).await.unwrap();

        let sub = svc
            .subscribe(&user(), schedule.id, "addr_123".to_string(), None)
            .await
            .unwrap();
        assert_eq!(sub.notification_preferences.advance_days, vec![1, 7]);
        assert_eq!(svc.list_subscriptions(&user()).await.unwrap().len(), 1);

        let foreign = svc.unsubscribe(sub.id, &UserId::new("intruder")).await;
        assert!(matches!(foreign, Err(HaulHubError::NotFound(_))));

        svc.unsubscribe(sub.id, &user()).await.unwrap();
        assert!(svc.list_subscriptions(&user()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_subscription_to_unknown_schedule() {
        let svc = make_service();
        let result = svc
            .subscribe(&user(), ScheduleId::new(), "addr_123".to_string(), None)
            .await;
        assert!(matches!(
            result,
            Err(HaulHubError::NotFound(NotFoundError { entity: Entity::Schedule, .. }))
        ));
    }
}

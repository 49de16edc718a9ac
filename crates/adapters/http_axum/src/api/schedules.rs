//! JSON REST handlers for pickup schedules and subscriptions.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use haulhub_domain::geo::GeoPoint;
use haulhub_domain::id::{ScheduleId, SubscriptionId};
use haulhub_domain::pagination::MAX_LIMIT;
use haulhub_domain::schedule::{
    Frequency, LocationQuery, PickupDay, PickupEvent, PickupSchedule, ScheduleMatch, ScheduleZone,
};
use haulhub_domain::subscription::{NotificationPreferences, Subscription};
use haulhub_domain::time::{parse_date, parse_time};

use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::extract::{CurrentUser, JsonBody, QueryParams, required_text};
use crate::state::{AppState, Repositories};

const DEFAULT_EVENT_LIMIT: u32 = 20;

/// Query parameters of the schedule lookup.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupQuery {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zip_code: Option<String>,
}

/// Query parameters of the events listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
}

/// A zone inside a schedule creation body.
#[derive(Debug, Default, Deserialize)]
pub struct ZoneBody {
    pub name: Option<String>,
    pub pickup_day: Option<String>,
    #[serde(default)]
    pub zip_codes: Vec<String>,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub radius_miles: Option<f64>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

impl ZoneBody {
    fn into_zone(self) -> Result<ScheduleZone, ApiError> {
        let name = required_text(self.name, "name")?;
        let day = required_text(self.pickup_day, "pickup_day")?.parse::<PickupDay>()?;
        let mut zone = ScheduleZone::new(name, day).with_zip_codes(self.zip_codes);
        if let (Some(lat), Some(lng), Some(radius)) =
            (self.center_lat, self.center_lng, self.radius_miles)
        {
            zone = zone.with_area(GeoPoint::new(lat, lng)?, radius);
        }
        if let Some(start) = self.time_start.as_deref() {
            zone.time_start = parse_time(start)?;
        }
        if let Some(end) = self.time_end.as_deref() {
            zone.time_end = parse_time(end)?;
        }
        Ok(zone)
    }
}

/// Request body for creating a schedule. Field names are `snake_case`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateScheduleBody {
    pub municipality_id: Option<String>,
    pub schedule_name: Option<String>,
    pub schedule_type: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub rules: Option<serde_json::Value>,
    #[serde(default)]
    pub zones: Vec<ZoneBody>,
}

/// Request body for subscribing to a schedule.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeBody {
    pub schedule_id: Option<String>,
    pub address_id: Option<String>,
    pub notification_preferences: Option<NotificationPreferences>,
}

#[derive(Debug, Serialize)]
pub struct MatchesData {
    pub schedules: Vec<ScheduleMatch>,
}

#[derive(Debug, Serialize)]
pub struct EventsData {
    pub events: Vec<PickupEvent>,
}

#[derive(Debug, Serialize)]
pub struct SchedulesData {
    pub schedules: Vec<PickupSchedule>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleData {
    pub schedule: PickupSchedule,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionData {
    pub subscription: Subscription,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionsData {
    pub subscriptions: Vec<Subscription>,
}

/// `GET /api/schedules/lookup`
pub async fn lookup<R: Repositories>(
    State(state): State<AppState<R>>,
    QueryParams(query): QueryParams<LookupQuery>,
) -> Result<ApiResponse<MatchesData>, ApiError> {
    let location = LocationQuery::new(
        query.address.as_deref(),
        query.lat,
        query.lng,
        query.zip_code.as_deref(),
    )?;
    let schedules = state.schedule_service.lookup(location).await?;
    Ok(ApiResponse::ok(MatchesData { schedules }))
}

/// `GET /api/schedules/{id}/events`
pub async fn events<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<EventsQuery>,
) -> Result<ApiResponse<EventsData>, ApiError> {
    let id = ScheduleId::parse(&id)?;
    let start = query.start_date.as_deref().map(parse_date).transpose()?;
    let end = query.end_date.as_deref().map(parse_date).transpose()?;
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT).clamp(1, MAX_LIMIT);

    let events = state
        .schedule_service
        .events(id, start, end, limit as usize)
        .await?;
    Ok(ApiResponse::ok(EventsData { events }))
}

/// `GET /api/schedules`
pub async fn list<R: Repositories>(
    State(state): State<AppState<R>>,
) -> Result<ApiResponse<SchedulesData>, ApiError> {
    let schedules = state.schedule_service.list_schedules().await?;
    Ok(ApiResponse::ok(SchedulesData { schedules }))
}

/// `POST /api/schedules`
pub async fn create<R: Repositories>(
    State(state): State<AppState<R>>,
    JsonBody(body): JsonBody<CreateScheduleBody>,
) -> Result<ApiResponse<ScheduleData>, ApiError> {
    let municipality_id = required_text(body.municipality_id, "municipality_id")?;
    let name = required_text(body.schedule_name, "schedule_name")?;
    let schedule_type = required_text(body.schedule_type, "schedule_type")?;
    let frequency = required_text(body.frequency, "frequency")?.parse::<Frequency>()?;
    let start_date = parse_date(&required_text(body.start_date, "start_date")?)?;

    let mut schedule =
        PickupSchedule::new(municipality_id, name, schedule_type, frequency, start_date);
    schedule.end_date = body.end_date.as_deref().map(parse_date).transpose()?;
    schedule.description = body.description;
    schedule.rules = body.rules;
    schedule.zones = body
        .zones
        .into_iter()
        .map(ZoneBody::into_zone)
        .collect::<Result<_, _>>()?;

    let schedule = state.schedule_service.create_schedule(schedule).await?;
    Ok(ApiResponse::created(ScheduleData { schedule })
        .with_message("Schedule created successfully"))
}

/// `POST /api/schedules/subscriptions`
pub async fn subscribe<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody<SubscribeBody>,
) -> Result<ApiResponse<SubscriptionData>, ApiError> {
    let schedule_id = ScheduleId::parse(&required_text(body.schedule_id, "scheduleId")?)?;
    let address_id = required_text(body.address_id, "addressId")?;

    let subscription = state
        .schedule_service
        .subscribe(&user, schedule_id, address_id, body.notification_preferences)
        .await?;
    Ok(ApiResponse::created(SubscriptionData { subscription })
        .with_message("Subscription created successfully"))
}

/// `GET /api/schedules/subscriptions`
pub async fn subscriptions<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiResponse<SubscriptionsData>, ApiError> {
    let subscriptions = state.schedule_service.list_subscriptions(&user).await?;
    Ok(ApiResponse::ok(SubscriptionsData { subscriptions }))
}

/// `DELETE /api/schedules/subscriptions/{id}`
pub async fn unsubscribe<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = SubscriptionId::parse(&id)?;
    state.schedule_service.unsubscribe(id, &user).await?;
    Ok(ApiResponse::message("Subscription deleted successfully"))
}

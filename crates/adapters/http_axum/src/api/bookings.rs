//! JSON REST handlers for service requests, quotes and bookings.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use haulhub_app::services::request_service::QuoteView;
use haulhub_domain::booking::{Booking, BookingStatus, CompletionReport, Slot};
use haulhub_domain::id::{BookingId, BusinessId, QuoteId, ServiceRequestId};
use haulhub_domain::pagination::Window;
use haulhub_domain::quote::{Quote, QuoteDraft};
use haulhub_domain::service_request::{ServiceRequest, UrgencyLevel};
use haulhub_domain::time::{parse_date, parse_slot_date, parse_time};

use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::extract::{
    CurrentUser, JsonBody, OptionalJsonBody, QueryParams, required, required_text,
};
use crate::state::{AppState, Repositories};

/// Request body for creating a service request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub address_id: Option<String>,
    pub service_category: Option<String>,
    pub description: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time_start: Option<String>,
    pub preferred_time_end: Option<String>,
    pub urgency_level: Option<String>,
    pub estimated_budget: Option<f64>,
    pub special_instructions: Option<String>,
    pub photos: Option<Vec<String>>,
}

/// Request body for placing a quote.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteBody {
    pub business_id: Option<String>,
    pub amount: Option<f64>,
    pub details: Option<String>,
    pub estimated_duration: Option<f64>,
    #[serde(default)]
    pub materials_included: bool,
    #[serde(default)]
    pub disposal_included: bool,
    #[serde(default)]
    pub additional_fees: BTreeMap<String, f64>,
    pub valid_days: Option<i64>,
    pub terms_and_conditions: Option<String>,
}

/// Request body for accepting a quote.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptQuoteBody {
    pub scheduled_date: Option<String>,
    pub scheduled_time_start: Option<String>,
    pub scheduled_time_end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
    #[serde(default)]
    pub before_photos: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    pub completion_notes: Option<String>,
    #[serde(default)]
    pub after_photos: Vec<String>,
    pub customer_signature: Option<String>,
}

/// Query parameters of the booking history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RequestData {
    pub request: ServiceRequest,
}

#[derive(Debug, Serialize)]
pub struct QuotesData {
    pub quotes: Vec<QuoteView>,
}

#[derive(Debug, Serialize)]
pub struct QuoteData {
    pub quote: Quote,
}

#[derive(Debug, Serialize)]
pub struct BookingData {
    pub booking: Booking,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryData {
    pub bookings: Vec<Booking>,
    pub total_count: u64,
    pub limit: u32,
    pub offset: u32,
}

fn optional_time(value: Option<&str>) -> Result<Option<chrono::NaiveTime>, ApiError> {
    Ok(value.map(parse_time).transpose()?)
}

/// `POST /api/bookings/requests`
pub async fn create_request<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody<CreateRequestBody>,
) -> Result<ApiResponse<RequestData>, ApiError> {
    let address_id = required_text(body.address_id, "addressId")?;
    let service_category = required_text(body.service_category, "serviceCategory")?;
    let description = required_text(body.description, "description")?;

    let preferred_date = body.preferred_date.as_deref().map(parse_date).transpose()?;
    let time_start = optional_time(body.preferred_time_start.as_deref())?;
    let time_end = optional_time(body.preferred_time_end.as_deref())?;
    let urgency = body
        .urgency_level
        .as_deref()
        .map(str::parse::<UrgencyLevel>)
        .transpose()?
        .unwrap_or_default();

    let request = ServiceRequest::builder()
        .customer_user_id(user)
        .address_id(address_id)
        .service_category(service_category)
        .description(description)
        .preferred_date(preferred_date)
        .preferred_window(time_start, time_end)
        .urgency_level(urgency)
        .estimated_budget(body.estimated_budget)
        .special_instructions(body.special_instructions)
        .photos(body.photos.unwrap_or_default())
        .build()?;

    let request = state.request_service.create_request(request).await?;
    Ok(ApiResponse::created(RequestData { request })
        .with_message("Service request created successfully"))
}

/// `GET /api/bookings/requests/{id}`
pub async fn get_request<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<RequestData>, ApiError> {
    let id = ServiceRequestId::parse(&id)?;
    let request = state.request_service.get_request(id).await?;
    Ok(ApiResponse::ok(RequestData { request }))
}

/// `GET /api/bookings/requests/{id}/quotes`
pub async fn list_quotes<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<QuotesData>, ApiError> {
    let id = ServiceRequestId::parse(&id)?;
    let quotes = state.request_service.list_quotes(id).await?;
    Ok(ApiResponse::ok(QuotesData { quotes }))
}

/// `POST /api/bookings/requests/{id}/quotes`
pub async fn submit_quote<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SubmitQuoteBody>,
) -> Result<ApiResponse<QuoteData>, ApiError> {
    let id = ServiceRequestId::parse(&id)?;
    let business_id = required_text(body.business_id, "businessId")?;
    let draft = QuoteDraft {
        business_id: Some(BusinessId::parse(&business_id)?),
        amount: Some(required(body.amount, "amount")?),
        details: body.details,
        estimated_duration: body.estimated_duration,
        materials_included: body.materials_included,
        disposal_included: body.disposal_included,
        additional_fees: body.additional_fees,
        valid_days: body.valid_days,
        terms_and_conditions: body.terms_and_conditions,
    };

    let quote = state.request_service.submit_quote(id, draft).await?;
    Ok(ApiResponse::created(QuoteData { quote }).with_message("Quote submitted successfully"))
}

/// `POST /api/bookings/quotes/{id}/accept`
pub async fn accept_quote<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AcceptQuoteBody>,
) -> Result<ApiResponse<BookingData>, ApiError> {
    let quote_id = QuoteId::parse(&id)?;
    let date = required_text(body.scheduled_date, "scheduledDate")?;
    let start = required_text(body.scheduled_time_start, "scheduledTimeStart")?;
    let slot = Slot {
        date: parse_slot_date(&date)?,
        start: parse_time(&start)?,
        end: optional_time(body.scheduled_time_end.as_deref())?,
    };

    let booking = state.booking_service.accept_quote(quote_id, slot).await?;
    Ok(ApiResponse::created(BookingData { booking })
        .with_message("Quote accepted and booking created successfully"))
}

/// `GET /api/bookings/history`
pub async fn history<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    QueryParams(query): QueryParams<HistoryQuery>,
) -> Result<ApiResponse<HistoryData>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<BookingStatus>)
        .transpose()?;
    let defaults = Window::default();
    let window = Window::new(
        query.offset.unwrap_or(defaults.offset),
        query.limit.unwrap_or(defaults.limit),
    );

    let page = state.booking_service.history(&user, status, window).await?;
    Ok(ApiResponse::ok(HistoryData {
        bookings: page.items,
        total_count: page.total_count,
        limit: window.limit,
        offset: window.offset,
    }))
}

/// `GET /api/bookings/{id}`
pub async fn get_booking<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<BookingData>, ApiError> {
    let id = BookingId::parse(&id)?;
    let booking = state.booking_service.get_booking(id).await?;
    Ok(ApiResponse::ok(BookingData { booking }))
}

/// `POST /api/bookings/{id}/cancel`
pub async fn cancel<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    OptionalJsonBody(body): OptionalJsonBody<CancelBody>,
) -> Result<ApiResponse<BookingData>, ApiError> {
    let id = BookingId::parse(&id)?;
    let booking = state.booking_service.cancel(id, &user, body.reason).await?;
    Ok(ApiResponse::ok(BookingData { booking }).with_message("Booking cancelled successfully"))
}

/// `POST /api/bookings/{id}/start`
pub async fn start<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    OptionalJsonBody(body): OptionalJsonBody<StartBody>,
) -> Result<ApiResponse<BookingData>, ApiError> {
    let id = BookingId::parse(&id)?;
    let booking = state.booking_service.start(id, body.before_photos).await?;
    Ok(ApiResponse::ok(BookingData { booking }).with_message("Booking started successfully"))
}

/// `POST /api/bookings/{id}/complete`
pub async fn complete<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    OptionalJsonBody(body): OptionalJsonBody<CompleteBody>,
) -> Result<ApiResponse<BookingData>, ApiError> {
    let id = BookingId::parse(&id)?;
    let report = CompletionReport {
        notes: body.completion_notes,
        after_photos: body.after_photos,
        customer_signature: body.customer_signature,
    };
    let booking = state.booking_service.complete(id, report).await?;
    Ok(ApiResponse::ok(BookingData { booking }).with_message("Booking completed successfully"))
}

//! JSON REST handlers for business search, profiles and reviews.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use haulhub_app::services::business_service::{BusinessProfile, NewReview};
use haulhub_domain::business::{
    Business, BusinessPhoto, PriceRange, ProfileUpdate, ServiceOffering,
};
use haulhub_domain::geo::GeoPoint;
use haulhub_domain::id::{BookingId, BusinessId, OfferingId};
use haulhub_domain::pagination::PageRequest;
use haulhub_domain::review::Review;
use haulhub_domain::search::{BusinessQuery, BusinessSummary, DEFAULT_RADIUS_MILES, SortBy};

use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::extract::{CurrentUser, JsonBody, QueryParams, required, required_text};
use crate::state::{AppState, Repositories};

/// Query parameters of the business search.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub service_category: Option<String>,
    pub min_rating: Option<f64>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query parameters of a paged listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

/// One offering in a profile update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBody {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub base_price: Option<f64>,
    pub price_unit: Option<String>,
    pub minimum_charge: Option<f64>,
    pub estimated_duration_hours: Option<f64>,
}

impl From<ServiceBody> for ServiceOffering {
    fn from(body: ServiceBody) -> Self {
        Self {
            id: OfferingId::new(),
            category: body.category,
            name: body.name,
            description: body.description,
            base_price: body.base_price,
            price_unit: body.price_unit,
            minimum_charge: body.minimum_charge,
            estimated_duration_hours: body.estimated_duration_hours,
        }
    }
}

/// Request body for creating or updating the caller's business.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub business_phone: Option<String>,
    pub business_email: Option<String>,
    pub license_number: Option<String>,
    pub service_radius_miles: Option<u32>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub price_range: Option<String>,
    pub response_time_hours: Option<u32>,
    pub services: Option<Vec<ServiceBody>>,
    pub photos: Option<Vec<BusinessPhoto>>,
}

/// Request body for reviewing a business.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub rating: Option<i64>,
    pub booking_id: Option<String>,
    pub review_title: Option<String>,
    pub review_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub businesses: Vec<BusinessSummary>,
    pub total_count: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub struct BusinessData {
    pub business: Business,
}

#[derive(Debug, Serialize)]
pub struct ReviewData {
    pub review: Review,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsData {
    pub reviews: Vec<Review>,
    pub total_count: u64,
    pub page: u32,
    pub limit: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

fn location(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>, ApiError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Some(GeoPoint::new(lat, lng)?)),
        _ => Ok(None),
    }
}

/// `GET /api/businesses/search`
pub async fn search<R: Repositories>(
    State(state): State<AppState<R>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<ApiResponse<SearchData>, ApiError> {
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.limit.unwrap_or(defaults.limit),
    );
    let sort_by = query
        .sort_by
        .as_deref()
        .map(str::parse::<SortBy>)
        .transpose()?
        .unwrap_or_default();
    let criteria = BusinessQuery {
        origin: location(query.lat, query.lng)?,
        radius_miles: Some(query.radius.unwrap_or(DEFAULT_RADIUS_MILES)),
        service_category: query.service_category.filter(|c| !c.is_empty()),
        min_rating: query.min_rating,
        sort_by,
        page,
    };

    let results = state.business_service.search(criteria).await?;
    Ok(ApiResponse::ok(SearchData {
        businesses: results.items,
        total_count: results.total_count,
        page: page.page,
        limit: page.limit,
    }))
}

/// `GET /api/businesses/{id}`
pub async fn get_profile<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<BusinessProfile>, ApiError> {
    let id = BusinessId::parse(&id)?;
    let profile = state.business_service.profile(id).await?;
    Ok(ApiResponse::ok(profile))
}

/// `POST /api/businesses/profile`
pub async fn upsert_profile<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody<ProfileBody>,
) -> Result<ApiResponse<BusinessData>, ApiError> {
    let name = required_text(body.business_name, "businessName")?;
    let business_type = required_text(body.business_type, "businessType")?;
    let update = ProfileUpdate {
        name,
        business_type,
        description: body.description,
        website_url: body.website_url,
        business_phone: body.business_phone,
        business_email: body.business_email,
        license_number: body.license_number,
        service_radius_miles: body.service_radius_miles,
        location: location(body.lat, body.lng)?,
        price_range: body
            .price_range
            .as_deref()
            .map(str::parse::<PriceRange>)
            .transpose()?,
        response_time_hours: body.response_time_hours,
        services: body
            .services
            .map(|services| services.into_iter().map(ServiceOffering::from).collect()),
        photos: body.photos,
    };

    let business = state.business_service.upsert_profile(&user, update).await?;
    Ok(ApiResponse::ok(BusinessData { business })
        .with_message("Business profile updated successfully"))
}

/// `GET /api/businesses/profile`
pub async fn own_profile<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiResponse<BusinessData>, ApiError> {
    let business = state.business_service.own_profile(&user).await?;
    Ok(ApiResponse::ok(BusinessData { business }))
}

/// `POST /api/businesses/{id}/reviews`
pub async fn create_review<R: Repositories>(
    State(state): State<AppState<R>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ReviewBody>,
) -> Result<ApiResponse<ReviewData>, ApiError> {
    let business_id = BusinessId::parse(&id)?;
    let review = NewReview {
        rating: required(body.rating, "rating")?,
        booking_id: body.booking_id.as_deref().map(BookingId::parse).transpose()?,
        title: body.review_title,
        text: body.review_text,
    };

    let review = state
        .business_service
        .add_review(business_id, &user, review)
        .await?;
    Ok(ApiResponse::created(ReviewData { review }).with_message("Review created successfully"))
}

/// `GET /api/businesses/{id}/reviews`
pub async fn list_reviews<R: Repositories>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<ApiResponse<ReviewsData>, ApiError> {
    let business_id = BusinessId::parse(&id)?;
    let page = query.page_request();
    let reviews = state.business_service.list_reviews(business_id, page).await?;
    Ok(ApiResponse::ok(ReviewsData {
        has_next: reviews.has_next(page.window()),
        has_prev: page.page > 1,
        reviews: reviews.items,
        total_count: reviews.total_count,
        page: page.page,
        limit: page.limit,
    }))
}

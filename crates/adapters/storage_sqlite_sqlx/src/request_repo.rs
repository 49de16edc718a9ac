//! `SQLite` implementation of [`ServiceRequestRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use haulhub_app::ports::ServiceRequestRepository;
use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::{ServiceRequestId, UserId};
use haulhub_domain::service_request::ServiceRequest;
use haulhub_domain::time::{format_date, format_time};

use crate::codec::{
    decode, decode_json, decode_opt_date, decode_opt_time, decode_ts, encode_json, encode_ts,
};
use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(ServiceRequest);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let customer_user_id: String = row.try_get("customer_user_id")?;
        let urgency_level: String = row.try_get("urgency_level")?;
        let status: String = row.try_get("status")?;
        let photos: String = row.try_get("photos")?;
        let expires_at: String = row.try_get("expires_at")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(ServiceRequest {
            id: decode(&id)?,
            customer_user_id: UserId::new(customer_user_id),
            address_id: row.try_get("address_id")?,
            service_category: row.try_get("service_category")?,
            description: row.try_get("description")?,
            preferred_date: decode_opt_date(row.try_get("preferred_date")?)?,
            preferred_time_start: decode_opt_time(row.try_get("preferred_time_start")?)?,
            preferred_time_end: decode_opt_time(row.try_get("preferred_time_end")?)?,
            urgency_level: decode(&urgency_level)?,
            estimated_budget: row.try_get("estimated_budget")?,
            special_instructions: row.try_get("special_instructions")?,
            photos: decode_json(&photos)?,
            status: decode(&status)?,
            expires_at: decode_ts(&expires_at)?,
            created_at: decode_ts(&created_at)?,
            updated_at: decode_ts(&updated_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO service_requests (
        id, customer_user_id, address_id, service_category, description,
        preferred_date, preferred_time_start, preferred_time_end, urgency_level,
        estimated_budget, special_instructions, photos, status, expires_at,
        created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM service_requests WHERE id = ?";

/// `SQLite`-backed service request repository.
#[derive(Clone)]
pub struct SqliteServiceRequestRepository {
    pool: SqlitePool,
}

impl SqliteServiceRequestRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ServiceRequestRepository for SqliteServiceRequestRepository {
    async fn create(&self, request: ServiceRequest) -> Result<ServiceRequest, HaulHubError> {
        let photos = encode_json(&request.photos)?;

        sqlx::query(INSERT)
            .bind(request.id.to_string())
            .bind(request.customer_user_id.as_str())
            .bind(&request.address_id)
            .bind(&request.service_category)
            .bind(&request.description)
            .bind(request.preferred_date.map(format_date))
            .bind(request.preferred_time_start.map(format_time))
            .bind(request.preferred_time_end.map(format_time))
            .bind(request.urgency_level.as_str())
            .bind(request.estimated_budget)
            .bind(&request.special_instructions)
            .bind(&photos)
            .bind(request.status.as_str())
            .bind(encode_ts(request.expires_at))
            .bind(encode_ts(request.created_at))
            .bind(encode_ts(request.updated_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(request)
    }

    async fn get_by_id(&self, id: ServiceRequestId) -> Result<Option<ServiceRequest>, HaulHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }
}

//! `SQLite` implementation of [`QuoteRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use haulhub_app::ports::QuoteRepository;
use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::{QuoteId, ServiceRequestId};
use haulhub_domain::quote::Quote;

use crate::codec::{decode, decode_json, decode_ts, encode_json, encode_ts};
use crate::error::StorageError;

pub(crate) struct Wrapper(pub(crate) Quote);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let request_id: String = row.try_get("request_id")?;
        let business_id: String = row.try_get("business_id")?;
        let additional_fees: String = row.try_get("additional_fees")?;
        let valid_until: String = row.try_get("valid_until")?;
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Quote {
            id: decode(&id)?,
            request_id: decode(&request_id)?,
            business_id: decode(&business_id)?,
            amount: row.try_get("amount")?,
            details: row.try_get("details")?,
            estimated_duration: row.try_get("estimated_duration")?,
            materials_included: row.try_get("materials_included")?,
            disposal_included: row.try_get("disposal_included")?,
            additional_fees: decode_json(&additional_fees)?,
            valid_until: decode_ts(&valid_until)?,
            status: decode(&status)?,
            terms_and_conditions: row.try_get("terms_and_conditions")?,
            created_at: decode_ts(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO quotes (
        id, request_id, business_id, amount, details, estimated_duration,
        materials_included, disposal_included, additional_fees, valid_until,
        status, terms_and_conditions, created_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM quotes WHERE id = ?";

const SELECT_FOR_REQUEST: &str =
    "SELECT * FROM quotes WHERE request_id = ? ORDER BY created_at ASC, rowid ASC";

/// `SQLite`-backed quote repository.
#[derive(Clone)]
pub struct SqliteQuoteRepository {
    pool: SqlitePool,
}

impl SqliteQuoteRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl QuoteRepository for SqliteQuoteRepository {
    async fn create(&self, quote: Quote) -> Result<Quote, HaulHubError> {
        let fees = encode_json(&quote.additional_fees)?;

        sqlx::query(INSERT)
            .bind(quote.id.to_string())
            .bind(quote.request_id.to_string())
            .bind(quote.business_id.to_string())
            .bind(quote.amount)
            .bind(&quote.details)
            .bind(quote.estimated_duration)
            .bind(quote.materials_included)
            .bind(quote.disposal_included)
            .bind(&fees)
            .bind(encode_ts(quote.valid_until))
            .bind(quote.status.as_str())
            .bind(&quote.terms_and_conditions)
            .bind(encode_ts(quote.created_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(quote)
    }

    async fn get_by_id(&self, id: QuoteId) -> Result<Option<Quote>, HaulHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn list_for_request(&self, request_id: ServiceRequestId) -> Result<Vec<Quote>, HaulHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_FOR_REQUEST)
            .bind(request_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

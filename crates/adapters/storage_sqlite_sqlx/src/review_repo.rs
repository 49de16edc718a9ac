//! `SQLite` implementation of [`ReviewRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use haulhub_app::ports::ReviewRepository;
use haulhub_domain::error::{Entity, HaulHubError, NotFoundError};
use haulhub_domain::id::{BusinessId, UserId};
use haulhub_domain::pagination::{Page, Window};
use haulhub_domain::review::Review;

use crate::codec::{decode, decode_err, decode_opt, decode_ts, encode_ts};
use crate::error::StorageError;

struct Wrapper(Review);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let business_id: String = row.try_get("business_id")?;
        let reviewer_user_id: String = row.try_get("reviewer_user_id")?;
        let rating: i64 = row.try_get("rating")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Review {
            id: decode(&id)?,
            business_id: decode(&business_id)?,
            reviewer_user_id: UserId::new(reviewer_user_id),
            booking_id: decode_opt(row.try_get("booking_id")?)?,
            rating: u8::try_from(rating).map_err(decode_err)?,
            title: row.try_get("review_title")?,
            text: row.try_get("review_text")?,
            is_public: row.try_get("is_public")?,
            is_verified: row.try_get("is_verified")?,
            created_at: decode_ts(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO reviews (
        id, business_id, reviewer_user_id, booking_id, rating, review_title,
        review_text, is_public, is_verified, created_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

/// Folds one rating into the stored running average.
const FOLD_RATING: &str = r"
    UPDATE businesses SET
        rating = (rating * rating_count + ?) / (rating_count + 1),
        rating_count = rating_count + 1
    WHERE id = ?
";

const SELECT_PUBLIC: &str = r"
    SELECT * FROM reviews
    WHERE business_id = ? AND is_public = 1
    ORDER BY created_at DESC, rowid DESC
    LIMIT ? OFFSET ?
";

const COUNT_PUBLIC: &str = "SELECT COUNT(*) FROM reviews WHERE business_id = ? AND is_public = 1";

/// `SQLite`-backed review repository.
#[derive(Clone)]
pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReviewRepository for SqliteReviewRepository {
    async fn create(&self, review: Review) -> Result<Review, HaulHubError> {
        let business_id = review.business_id.to_string();
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let folded = sqlx::query(FOLD_RATING)
            .bind(f64::from(review.rating))
            .bind(&business_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        if folded.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: Entity::Business,
                id: business_id,
            }
            .into());
        }

        sqlx::query(INSERT)
            .bind(review.id.to_string())
            .bind(&business_id)
            .bind(review.reviewer_user_id.as_str())
            .bind(review.booking_id.map(|id| id.to_string()))
            .bind(i64::from(review.rating))
            .bind(&review.title)
            .bind(&review.text)
            .bind(review.is_public)
            .bind(review.is_verified)
            .bind(encode_ts(review.created_at))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;

        Ok(review)
    }

    async fn list_public(
        &self,
        business_id: BusinessId,
        window: Window,
    ) -> Result<Page<Review>, HaulHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_PUBLIC)
            .bind(business_id.to_string())
            .bind(i64::from(window.limit))
            .bind(i64::from(window.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let (total,): (i64,) = sqlx::query_as(COUNT_PUBLIC)
            .bind(business_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Page::new(
            rows.into_iter().map(|w| w.0).collect(),
            u64::try_from(total).unwrap_or_default(),
        ))
    }
}

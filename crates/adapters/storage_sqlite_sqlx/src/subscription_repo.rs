//! `SQLite` implementation of [`SubscriptionRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use haulhub_app::ports::SubscriptionRepository;
use haulhub_domain::error::HaulHubError;
use haulhub_domain::id::{SubscriptionId, UserId};
use haulhub_domain::subscription::Subscription;

use crate::codec::{decode, decode_json, decode_ts, encode_json, encode_ts};
use crate::error::StorageError;

struct Wrapper(Subscription);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let user_id: String = row.try_get("user_id")?;
        let schedule_id: String = row.try_get("schedule_id")?;
        let preferences: String = row.try_get("notification_preferences")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Subscription {
            id: decode(&id)?,
            user_id: UserId::new(user_id),
            address_id: row.try_get("address_id")?,
            schedule_id: decode(&schedule_id)?,
            notification_preferences: decode_json(&preferences)?,
            is_active: row.try_get("is_active")?,
            created_at: decode_ts(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO schedule_subscriptions (
        id, user_id, address_id, schedule_id, notification_preferences,
        is_active, created_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

const SELECT_ACTIVE_FOR_USER: &str = r"
    SELECT * FROM schedule_subscriptions
    WHERE user_id = ? AND is_active = 1
    ORDER BY created_at DESC, rowid DESC
";

const SELECT_FOR_USER: &str = "SELECT * FROM schedule_subscriptions WHERE id = ? AND user_id = ?";

const DELETE: &str = "DELETE FROM schedule_subscriptions WHERE id = ?";

/// `SQLite`-backed schedule subscription repository.
#[derive(Clone)]
pub struct SqliteSubscriptionRepository {
    pool: SqlitePool,
}

impl SqliteSubscriptionRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SubscriptionRepository for SqliteSubscriptionRepository {
    async fn create(&self, subscription: Subscription) -> Result<Subscription, HaulHubError> {
        let preferences = encode_json(&subscription.notification_preferences)?;

        sqlx::query(INSERT)
            .bind(subscription.id.to_string())
            .bind(subscription.user_id.as_str())
            .bind(&subscription.address_id)
            .bind(subscription.schedule_id.to_string())
            .bind(&preferences)
            .bind(subscription.is_active)
            .bind(encode_ts(subscription.created_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(subscription)
    }

    async fn list_active_for_user(&self, user: &UserId) -> Result<Vec<Subscription>, HaulHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ACTIVE_FOR_USER)
            .bind(user.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_for_user(
        &self,
        id: SubscriptionId,
        user: &UserId,
    ) -> Result<Option<Subscription>, HaulHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_FOR_USER)
            .bind(id.to_string())
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn delete(&self, id: SubscriptionId) -> Result<(), HaulHubError> {
        sqlx::query(DELETE)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}

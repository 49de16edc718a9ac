//! `SQLite` implementation of [`BusinessRepository`].
//!
//! Offerings live in `business_services`, one row each, ordered by `position`.

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use haulhub_app::ports::BusinessRepository;
use haulhub_domain::business::{Business, ServiceOffering};
use haulhub_domain::error::HaulHubError;
use haulhub_domain::geo::GeoPoint;
use haulhub_domain::id::{BusinessId, UserId};

use crate::codec::{decode, decode_err, decode_json, decode_opt, decode_ts, decode_u32, encode_json, encode_ts};
use crate::error::StorageError;

/// A business row; offerings are attached afterwards.
struct Wrapper(Business);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let user_id: String = row.try_get("user_id")?;
        let lat: Option<f64> = row.try_get("lat")?;
        let lng: Option<f64> = row.try_get("lng")?;
        let response_time_hours: Option<i64> = row.try_get("response_time_hours")?;
        let photos: String = row.try_get("photos")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        let location = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng).map_err(decode_err)?),
            _ => None,
        };

        Ok(Self(Business {
            id: decode(&id)?,
            user_id: UserId::new(user_id),
            name: row.try_get("name")?,
            business_type: row.try_get("business_type")?,
            description: row.try_get("description")?,
            website_url: row.try_get("website_url")?,
            business_phone: row.try_get("business_phone")?,
            business_email: row.try_get("business_email")?,
            license_number: row.try_get("license_number")?,
            service_radius_miles: decode_u32(row.try_get("service_radius_miles")?)?,
            location,
            price_range: decode_opt(row.try_get("price_range")?)?,
            response_time_hours: response_time_hours.map(decode_u32).transpose()?,
            is_verified: row.try_get("is_verified")?,
            is_active: row.try_get("is_active")?,
            subscription_tier: row.try_get("subscription_tier")?,
            rating: row.try_get("rating")?,
            rating_count: decode_u32(row.try_get("rating_count")?)?,
            total_jobs_completed: decode_u32(row.try_get("total_jobs_completed")?)?,
            services: Vec::new(),
            photos: decode_json(&photos)?,
            created_at: decode_ts(&created_at)?,
            updated_at: decode_ts(&updated_at)?,
        }))
    }
}

/// An offering together with the business it belongs to.
struct OfferingWrapper(BusinessId, ServiceOffering);

impl<'r> FromRow<'r, SqliteRow> for OfferingWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let business_id: String = row.try_get("business_id")?;

        Ok(Self(
            decode(&business_id)?,
            ServiceOffering {
                id: decode(&id)?,
                category: row.try_get("category")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                base_price: row.try_get("base_price")?,
                price_unit: row.try_get("price_unit")?,
                minimum_charge: row.try_get("minimum_charge")?,
                estimated_duration_hours: row.try_get("estimated_duration_hours")?,
            },
        ))
    }
}

const SELECT_BY_ID: &str = "SELECT * FROM businesses WHERE id = ?";

const SELECT_BY_USER: &str = "SELECT * FROM businesses WHERE user_id = ?";

const SELECT_ACTIVE: &str =
    "SELECT * FROM businesses WHERE is_active = 1 ORDER BY created_at ASC, rowid ASC";

const SELECT_SERVICES: &str =
    "SELECT * FROM business_services WHERE business_id = ? ORDER BY position ASC";

const SELECT_ACTIVE_SERVICES: &str = r"
    SELECT s.* FROM business_services s
    JOIN businesses b ON b.id = s.business_id
    WHERE b.is_active = 1
    ORDER BY s.business_id, s.position ASC
";

const UPSERT: &str = r"
    INSERT INTO businesses (
        id, user_id, name, business_type, description, website_url,
        business_phone, business_email, license_number, service_radius_miles,
        lat, lng, price_range, response_time_hours, is_verified, is_active,
        subscription_tier, rating, rating_count, total_jobs_completed, photos,
        created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        business_type = excluded.business_type,
        description = excluded.description,
        website_url = excluded.website_url,
        business_phone = excluded.business_phone,
        business_email = excluded.business_email,
        license_number = excluded.license_number,
        service_radius_miles = excluded.service_radius_miles,
        lat = excluded.lat,
        lng = excluded.lng,
        price_range = excluded.price_range,
        response_time_hours = excluded.response_time_hours,
        is_verified = excluded.is_verified,
        is_active = excluded.is_active,
        subscription_tier = excluded.subscription_tier,
        total_jobs_completed = excluded.total_jobs_completed,
        photos = excluded.photos,
        updated_at = excluded.updated_at
";

const DELETE_SERVICES: &str = "DELETE FROM business_services WHERE business_id = ?";

const INSERT_SERVICE: &str = r"
    INSERT INTO business_services (
        id, business_id, position, category, name, description, base_price,
        price_unit, minimum_charge, estimated_duration_hours
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

/// `SQLite`-backed business repository.
#[derive(Clone)]
pub struct SqliteBusinessRepository {
    pool: SqlitePool,
}

impl SqliteBusinessRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn with_services(&self, row: Option<Wrapper>) -> Result<Option<Business>, HaulHubError> {
        let Some(Wrapper(mut business)) = row else {
            return Ok(None);
        };
        let services: Vec<OfferingWrapper> = sqlx::query_as(SELECT_SERVICES)
            .bind(business.id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        business.services = services.into_iter().map(|w| w.1).collect();
        Ok(Some(business))
    }
}

impl BusinessRepository for SqliteBusinessRepository {
    async fn get_by_id(&self, id: BusinessId) -> Result<Option<Business>, HaulHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        self.with_services(row).await
    }

    async fn find_by_user(&self, user: &UserId) -> Result<Option<Business>, HaulHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_USER)
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        self.with_services(row).await
    }

    async fn list_active(&self) -> Result<Vec<Business>, HaulHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ACTIVE)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let offerings: Vec<OfferingWrapper> = sqlx::query_as(SELECT_ACTIVE_SERVICES)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let mut by_business: HashMap<BusinessId, Vec<ServiceOffering>> = HashMap::new();
        for OfferingWrapper(business_id, offering) in offerings {
            by_business.entry(business_id).or_default().push(offering);
        }

        Ok(rows
            .into_iter()
            .map(|Wrapper(mut business)| {
                business.services = by_business.remove(&business.id).unwrap_or_default();
                business
            })
            .collect())
    }

    /// Rating columns are left alone on update; reviews own them.
    async fn upsert(&self, business: Business) -> Result<Business, HaulHubError> {
        let photos = encode_json(&business.photos)?;
        let id = business.id.to_string();
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        sqlx::query(UPSERT)
            .bind(&id)
            .bind(business.user_id.as_str())
            .bind(&business.name)
            .bind(&business.business_type)
            .bind(&business.description)
            .bind(&business.website_url)
            .bind(&business.business_phone)
            .bind(&business.business_email)
            .bind(&business.license_number)
            .bind(i64::from(business.service_radius_miles))
            .bind(business.location.map(|p| p.lat))
            .bind(business.location.map(|p| p.lng))
            .bind(business.price_range.map(|p| p.as_str()))
            .bind(business.response_time_hours.map(i64::from))
            .bind(business.is_verified)
            .bind(business.is_active)
            .bind(&business.subscription_tier)
            .bind(business.rating)
            .bind(i64::from(business.rating_count))
            .bind(i64::from(business.total_jobs_completed))
            .bind(&photos)
            .bind(encode_ts(business.created_at))
            .bind(encode_ts(business.updated_at))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        sqlx::query(DELETE_SERVICES)
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        for (position, offering) in business.services.iter().enumerate() {
            sqlx::query(INSERT_SERVICE)
                .bind(offering.id.to_string())
                .bind(&id)
                .bind(i64::try_from(position).unwrap_or(i64::MAX))
                .bind(&offering.category)
                .bind(&offering.name)
                .bind(&offering.description)
                .bind(offering.base_price)
                .bind(&offering.price_unit)
                .bind(offering.minimum_charge)
                .bind(offering.estimated_duration_hours)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
        }

        tx.commit().await.map_err(StorageError::from)?;
        tracing::debug!(business_id = %id, services = business.services.len(), "business saved");

        Ok(business)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use haulhub_domain::business::{BusinessPhoto, PriceRange, ProfileUpdate};
    use haulhub_domain::id::OfferingId;
    use haulhub_domain::time::now;

    async fn setup() -> SqliteBusinessRepository {
        let db = Config::memory().build().await.unwrap();
        SqliteBusinessRepository::new(db.pool().clone())
    }

    fn offering(category: &str) -> ServiceOffering {
        ServiceOffering {
            id: OfferingId::new(),
            category: category.to_string(),
            name: category.replace('_', " "),
            description: None,
            base_price: Some(100.0),
            price_unit: Some("per_job".to_string()),
            minimum_charge: None,
            estimated_duration_hours: None,
        }
    }

    fn business(owner: &str, categories: &[&str]) -> Business {
        Business::create(
            UserId::new(owner),
            ProfileUpdate {
                name: "Green Cleanup".to_string(),
                business_type: "junk_removal".to_string(),
                location: Some(GeoPoint::new(39.78, -89.65).unwrap()),
                price_range: Some(PriceRange::Budget),
                response_time_hours: Some(2),
                services: Some(categories.iter().copied().map(offering).collect()),
                photos: Some(vec![BusinessPhoto {
                    url: "https://example.com/truck.jpg".to_string(),
                    kind: "profile".to_string(),
                    caption: None,
                }]),
                ..ProfileUpdate::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn should_round_trip_business_with_offerings_in_order() {
        let repo = setup().await;
        let created = repo
            .upsert(business("owner_1", &["junk_removal", "yard_cleanup", "moving"]))
            .await
            .unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        let categories: Vec<&str> = fetched.services.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, vec!["junk_removal", "yard_cleanup", "moving"]);
        assert_eq!(fetched.price_range, Some(PriceRange::Budget));
        assert_eq!(fetched.response_time_hours, Some(2));
        assert_eq!(fetched.location, created.location);
        assert_eq!(fetched.photos[0].kind, "profile");
    }

    #[tokio::test]
    async fn should_replace_offerings_on_update() {
        let repo = setup().await;
        let mut saved = repo
            .upsert(business("owner_1", &["junk_removal", "yard_cleanup"]))
            .await
            .unwrap();

        saved.services = vec![offering("moving")];
        saved.name = "Green Moving".to_string();
        saved.updated_at = now();
        repo.upsert(saved.clone()).await.unwrap();

        let fetched = repo.find_by_user(&UserId::new("owner_1")).await.unwrap().unwrap();
        assert_eq!(fetched.id, saved.id);
        assert_eq!(fetched.name, "Green Moving");
        assert_eq!(fetched.services.len(), 1);
        assert_eq!(fetched.services[0].category, "moving");
    }

    #[tokio::test]
    async fn should_list_only_active_businesses_with_their_offerings() {
        let repo = setup().await;
        repo.upsert(business("owner_1", &["junk_removal"])).await.unwrap();
        let mut inactive = business("owner_2", &["moving"]);
        inactive.is_active = false;
        repo.upsert(inactive).await.unwrap();
        repo.upsert(business("owner_3", &["yard_cleanup", "moving"]))
            .await
            .unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].user_id.as_str(), "owner_1");
        assert_eq!(active[1].services.len(), 2);
    }

    #[tokio::test]
    async fn should_return_none_for_unknown_owner() {
        let repo = setup().await;
        assert!(repo.find_by_user(&UserId::new("nobody")).await.unwrap().is_none());
    }
}

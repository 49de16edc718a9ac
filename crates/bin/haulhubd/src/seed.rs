//! Demo data for an empty database.
//!
//! Populates a few hauling businesses (with reviews) and one municipal
//! pickup schedule so the read endpoints have something to return.

use haulhub_app::ports::{BusinessRepository, ReviewRepository, ScheduleRepository};
use haulhub_domain::business::{Business, PriceRange, ProfileUpdate, ServiceOffering};
use haulhub_domain::error::HaulHubError;
use haulhub_domain::geo::GeoPoint;
use haulhub_domain::id::{OfferingId, UserId};
use haulhub_domain::review::Review;
use haulhub_domain::schedule::{Frequency, PickupDay, PickupSchedule, ScheduleZone};
use haulhub_domain::time::parse_date;

struct DemoBusiness {
    owner: &'static str,
    name: &'static str,
    business_type: &'static str,
    category: &'static str,
    service: &'static str,
    base_price: f64,
    location: (f64, f64),
    price_range: PriceRange,
    ratings: &'static [i64],
}

const BUSINESSES: &[DemoBusiness] = &[
    DemoBusiness {
        owner: "demo_owner_1",
        name: "Prairie Junk Haulers",
        business_type: "junk_removal",
        category: "junk_removal",
        service: "Full truck load",
        base_price: 350.0,
        location: (39.7817, -89.6501),
        price_range: PriceRange::Moderate,
        ratings: &[5, 4, 5],
    },
    DemoBusiness {
        owner: "demo_owner_2",
        name: "Capitol Cleanouts",
        business_type: "junk_removal",
        category: "estate_cleanout",
        service: "Estate cleanout",
        base_price: 900.0,
        location: (39.8014, -89.6440),
        price_range: PriceRange::Premium,
        ratings: &[4],
    },
    DemoBusiness {
        owner: "demo_owner_3",
        name: "Lincoln Land Dumpsters",
        business_type: "dumpster_rental",
        category: "dumpster_rental",
        service: "10 yard dumpster, 7 days",
        base_price: 275.0,
        location: (39.7456, -89.6750),
        price_range: PriceRange::Budget,
        ratings: &[3, 4],
    },
];

fn business(demo: &DemoBusiness) -> Result<Business, HaulHubError> {
    let (lat, lng) = demo.location;
    Business::create(
        UserId::new(demo.owner),
        ProfileUpdate {
            name: demo.name.to_string(),
            business_type: demo.business_type.to_string(),
            description: Some(format!("{} serving the Springfield area.", demo.name)),
            location: Some(GeoPoint::new(lat, lng)?),
            price_range: Some(demo.price_range),
            response_time_hours: Some(24),
            services: Some(vec![ServiceOffering {
                id: OfferingId::new(),
                category: demo.category.to_string(),
                name: demo.service.to_string(),
                description: None,
                base_price: Some(demo.base_price),
                price_unit: Some("job".to_string()),
                minimum_charge: Some(demo.base_price / 2.0),
                estimated_duration_hours: Some(3.0),
            }]),
            ..ProfileUpdate::default()
        },
    )
}

fn springfield() -> Result<PickupSchedule, HaulHubError> {
    let mut schedule = PickupSchedule::new(
        "springfield_il",
        "Springfield Residential Trash",
        "trash",
        Frequency::Weekly,
        parse_date("2025-01-01")?,
    );
    schedule.description = Some("Curbside household trash collection".to_string());
    schedule.rules = Some(serde_json::json!({ "maxBags": 4, "bulkItems": "call ahead" }));
    schedule.zones = vec![
        ScheduleZone::new("North", PickupDay::Monday)
            .with_zip_codes(vec!["62701".to_string(), "62702".to_string()]),
        ScheduleZone::new("South", PickupDay::Thursday)
            .with_zip_codes(vec!["62703".to_string()])
            .with_area(GeoPoint::new(39.75, -89.65)?, 3.0),
    ];
    Ok(schedule)
}

/// Insert the demo data unless the database already holds businesses.
///
/// Returns whether anything was inserted.
///
/// # Errors
///
/// Returns a storage error propagated from a repository.
pub async fn demo<B, V, S>(businesses: &B, reviews: &V, schedules: &S) -> Result<bool, HaulHubError>
where
    B: BusinessRepository,
    V: ReviewRepository,
    S: ScheduleRepository,
{
    if !businesses.list_active().await?.is_empty() {
        tracing::debug!("database already populated, skipping demo seed");
        return Ok(false);
    }

    for demo in BUSINESSES {
        let created = businesses.upsert(business(demo)?).await?;
        for (n, rating) in demo.ratings.iter().enumerate() {
            let review = Review::new(
                created.id,
                UserId::new(format!("demo_customer_{n}")),
                None,
                *rating,
                Some("Great service".to_string()),
                None,
            )?;
            reviews.create(review).await?;
        }
    }
    schedules.create(springfield()?).await?;

    tracing::info!(businesses = BUSINESSES.len(), "demo data seeded");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulhub_adapter_storage_sqlite_sqlx::{
        Config, SqliteBusinessRepository, SqliteReviewRepository, SqliteScheduleRepository,
    };

    #[tokio::test]
    async fn should_seed_empty_database_once() {
        let db = Config::memory().build().await.unwrap();
        let businesses = SqliteBusinessRepository::new(db.pool().clone());
        let reviews = SqliteReviewRepository::new(db.pool().clone());
        let schedules = SqliteScheduleRepository::new(db.pool().clone());

        assert!(demo(&businesses, &reviews, &schedules).await.unwrap());
        assert!(!demo(&businesses, &reviews, &schedules).await.unwrap());

        let seeded = businesses.list_active().await.unwrap();
        assert_eq!(seeded.len(), BUSINESSES.len());
        let prairie = seeded
            .iter()
            .find(|b| b.name == "Prairie Junk Haulers")
            .unwrap();
        assert_eq!(prairie.rating_count, 3);
        assert!((prairie.rating - 14.0 / 3.0).abs() < 1e-9);

        let active = schedules.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].zones.len(), 2);
    }
}

//! In-memory business search: filter, measure distance, sort, page.

use std::cmp::Ordering;

use serde::Serialize;

use crate::business::{Business, PriceRange};
use crate::geo::GeoPoint;
use crate::id::BusinessId;
use crate::pagination::{Page, PageRequest};

/// Search radius when the caller gives coordinates but no radius.
pub const DEFAULT_RADIUS_MILES: f64 = 10.0;

wire_enum!(
    /// Result ordering.
    SortBy, field = "sortBy", default = Distance {
        Distance => "distance",
        Rating => "rating",
        Price => "price",
    }
);

/// Criteria for [`search`].
#[derive(Debug, Clone, Default)]
pub struct BusinessQuery {
    /// When set, results carry a distance and are limited to `radius_miles`.
    pub origin: Option<GeoPoint>,
    /// Applies only with an `origin`. Defaults to [`DEFAULT_RADIUS_MILES`].
    ///
    /// Businesses without a stored location have no distance, so the radius
    /// cannot exclude them. They are kept and sort after every located match
    /// under [`SortBy::Distance`].
    pub radius_miles: Option<f64>,
    pub service_category: Option<String>,
    pub min_rating: Option<f64>,
    pub sort_by: SortBy,
    pub page: PageRequest,
}

/// One search hit, shaped for listing pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSummary {
    pub id: BusinessId,
    pub name: String,
    pub rating: f64,
    pub rating_count: u32,
    pub distance: Option<f64>,
    pub services: Vec<String>,
    pub price_range: Option<PriceRange>,
    pub profile_image_url: Option<String>,
    pub response_time: Option<String>,
    pub is_verified: bool,
    pub total_jobs_completed: u32,
}

impl BusinessSummary {
    fn from_business(business: &Business, distance: Option<f64>) -> Self {
        let mut services: Vec<String> = business
            .services
            .iter()
            .map(|s| s.category.clone())
            .collect();
        services.sort();
        services.dedup();

        let profile_image_url = business
            .photos
            .iter()
            .find(|p| p.kind == "profile")
            .or_else(|| business.photos.first())
            .map(|p| p.url.clone());

        Self {
            id: business.id,
            name: business.name.clone(),
            rating: business.rating,
            rating_count: business.rating_count,
            distance: distance.map(|d| (d * 10.0).round() / 10.0),
            services,
            price_range: business.price_range,
            profile_image_url,
            response_time: business.response_time_hours.map(describe_response_time),
            is_verified: business.is_verified,
            total_jobs_completed: business.total_jobs_completed,
        }
    }
}

fn describe_response_time(hours: u32) -> String {
    match hours {
        0 => "same day".to_string(),
        1 => "within 1 hour".to_string(),
        h => format!("within {h} hours"),
    }
}

/// Run `query` over `businesses`.
///
/// Inactive businesses never match. The returned total counts every match
/// before paging.
#[must_use]
pub fn search(businesses: &[Business], query: &BusinessQuery) -> Page<BusinessSummary> {
    let radius = query.radius_miles.unwrap_or(DEFAULT_RADIUS_MILES);

    let mut hits: Vec<BusinessSummary> = businesses
        .iter()
        .filter(|b| b.is_active)
        .filter(|b| {
            query
                .service_category
                .as_deref()
                .is_none_or(|category| b.offers(category))
        })
        .filter(|b| query.min_rating.is_none_or(|min| b.rating >= min))
        .filter_map(|b| {
            let distance = match (query.origin, b.location) {
                (Some(origin), Some(location)) => Some(origin.distance_miles(&location)),
                _ => None,
            };
            if query.origin.is_some() && distance.is_some_and(|d| d > radius) {
                return None;
            }
            Some(BusinessSummary::from_business(b, distance))
        })
        .collect();

    match query.sort_by {
        SortBy::Distance => hits.sort_by(|a, b| match (a.distance, b.distance) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortBy::Rating => hits.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortBy::Price => hits.sort_by_key(|h| PriceRange::rank(h.price_range)),
    }

    let total = hits.len() as u64;
    Page::new(query.page.window().apply(hits), total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::{ProfileUpdate, ServiceOffering};
    use crate::id::{OfferingId, UserId};

    fn business(
        name: &str,
        rating: f64,
        location: (f64, f64),
        category: &str,
        price: PriceRange,
    ) -> Business {
        let mut b = Business::create(
            UserId::new(format!("owner_{name}")),
            ProfileUpdate {
                name: name.to_string(),
                business_type: "junk_removal".to_string(),
                location: Some(GeoPoint::new(location.0, location.1).unwrap()),
                price_range: Some(price),
                services: Some(vec![ServiceOffering {
                    id: OfferingId::new(),
                    category: category.to_string(),
                    name: category.to_string(),
                    description: None,
                    base_price: None,
                    price_unit: None,
                    minimum_charge: None,
                    estimated_duration_hours: None,
                }]),
                ..ProfileUpdate::default()
            },
        )
        .unwrap();
        b.rating = rating;
        b
    }

    fn fixtures() -> Vec<Business> {
        vec![
            business("EcoWaste Pros", 4.6, (39.84, -89.65), "recycling", PriceRange::Budget),
            business("Green Cleanup", 4.8, (39.80, -89.65), "yard_cleanup", PriceRange::Moderate),
            business("Rapid Trash", 4.7, (39.82, -89.65), "appliance_pickup", PriceRange::Premium),
            business("Far Away Hauling", 5.0, (41.87, -87.62), "yard_cleanup", PriceRange::Budget),
        ]
    }

    fn springfield() -> Option<GeoPoint> {
        Some(GeoPoint::new(39.7817, -89.6501).unwrap())
    }

    fn names(page: &Page<BusinessSummary>) -> Vec<&str> {
        page.items.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn should_sort_by_distance_and_drop_out_of_radius() {
        let query = BusinessQuery {
            origin: springfield(),
            ..BusinessQuery::default()
        };
        let page = search(&fixtures(), &query);
        assert_eq!(page.total_count, 3);
        assert_eq!(names(&page), ["Green Cleanup", "Rapid Trash", "EcoWaste Pros"]);
        assert!(page.items.iter().all(|h| h.distance.is_some()));
    }

    #[test]
    fn should_keep_unlocated_business_last_within_radius() {
        let mut unlocated = business(
            "Mystery Movers",
            4.9,
            (0.0, 0.0),
            "recycling",
            PriceRange::Budget,
        );
        unlocated.location = None;
        let mut businesses = fixtures();
        businesses.insert(0, unlocated);

        let query = BusinessQuery {
            origin: springfield(),
            radius_miles: Some(1.5),
            ..BusinessQuery::default()
        };
        let page = search(&businesses, &query);
        assert_eq!(names(&page), ["Green Cleanup", "Mystery Movers"]);
        assert!(page.items[1].distance.is_none());
    }

    #[test]
    fn should_ignore_radius_without_origin() {
        let page = search(&fixtures(), &BusinessQuery::default());
        assert_eq!(page.total_count, 4);
        assert!(page.items.iter().all(|h| h.distance.is_none()));
    }

    #[test]
    fn should_sort_by_rating_descending() {
        let query = BusinessQuery {
            sort_by: SortBy::Rating,
            ..BusinessQuery::default()
        };
        let page = search(&fixtures(), &query);
        assert_eq!(page.items[0].name, "Far Away Hauling");
        assert_eq!(page.items[3].name, "EcoWaste Pros");
    }

    #[test]
    fn should_sort_by_price_cheapest_first() {
        let query = BusinessQuery {
            origin: springfield(),
            sort_by: SortBy::Price,
            ..BusinessQuery::default()
        };
        let page = search(&fixtures(), &query);
        assert_eq!(names(&page), ["EcoWaste Pros", "Green Cleanup", "Rapid Trash"]);
    }

    #[test]
    fn should_filter_by_category_and_min_rating() {
        let query = BusinessQuery {
            service_category: Some("yard_cleanup".to_string()),
            min_rating: Some(4.9),
            ..BusinessQuery::default()
        };
        let page = search(&fixtures(), &query);
        assert_eq!(names(&page), ["Far Away Hauling"]);
    }

    #[test]
    fn should_page_after_counting_all_matches() {
        let query = BusinessQuery {
            sort_by: SortBy::Rating,
            page: PageRequest::new(2, 3),
            ..BusinessQuery::default()
        };
        let page = search(&fixtures(), &query);
        assert_eq!(page.total_count, 4);
        assert_eq!(names(&page), ["EcoWaste Pros"]);
    }

    #[test]
    fn should_skip_inactive_businesses() {
        let mut all = fixtures();
        all[1].is_active = false;
        let page = search(&all, &BusinessQuery::default());
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn should_describe_response_time() {
        assert_eq!(describe_response_time(0), "same day");
        assert_eq!(describe_response_time(2), "within 2 hours");
    }
}

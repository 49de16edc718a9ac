//! Business service: search, profiles and reviews.

use haulhub_domain::business::{Business, ProfileUpdate};
use haulhub_domain::error::{Entity, HaulHubError, NotFoundError};
use haulhub_domain::id::{BookingId, BusinessId, UserId};
use haulhub_domain::pagination::{Page, PageRequest, Window};
use haulhub_domain::review::Review;
use haulhub_domain::search::{self, BusinessQuery, BusinessSummary};
use haulhub_domain::time::now;
use serde::Serialize;

use crate::ports::{BusinessRepository, ReviewRepository};

/// Number of recent reviews embedded in a public profile.
pub const PROFILE_REVIEW_COUNT: u32 = 10;

/// Public profile: the business plus its most recent reviews.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessProfile {
    #[serde(flatten)]
    pub business: Business,
    pub reviews: Vec<Review>,
}

/// What a customer submits when reviewing a business.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub rating: i64,
    pub booking_id: Option<BookingId>,
    pub title: Option<String>,
    pub text: Option<String>,
}

/// Application service for businesses and their reviews.
pub struct BusinessService<BR, RR> {
    businesses: BR,
    reviews: RR,
}

impl<BR, RR> BusinessService<BR, RR>
where
    BR: BusinessRepository,
    RR: ReviewRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(businesses: BR, reviews: RR) -> Self {
        Self {
            businesses,
            reviews,
        }
    }

    /// Filter, sort and page the active businesses.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: BusinessQuery) -> Result<Page<BusinessSummary>, HaulHubError> {
        let businesses = self.businesses.list_active().await?;
        let page = search::search(&businesses, &query);
        tracing::debug!(candidates = businesses.len(), matches = page.total_count, "business search");
        Ok(page)
    }

    /// Look up a business by id.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when no business with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_business(&self, id: BusinessId) -> Result<Business, HaulHubError> {
        self.businesses.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: Entity::Business,
                id: id.to_string(),
            }
            .into()
        })
    }

    /// A business with its most recent public reviews.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when no business with `id` exists,
    /// or a storage error from a repository.
    #[tracing::instrument(skip(self))]
    pub async fn profile(&self, id: BusinessId) -> Result<BusinessProfile, HaulHubError> {
        let business = self.get_business(id).await?;
        let reviews = self
            .reviews
            .list_public(id, Window::new(0, PROFILE_REVIEW_COUNT))
            .await?;
        Ok(BusinessProfile {
            business,
            reviews: reviews.items,
        })
    }

    /// Create `owner`'s business, or update it if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, update), fields(business_name = %update.name))]
    pub async fn upsert_profile(
        &self,
        owner: &UserId,
        update: ProfileUpdate,
    ) -> Result<Business, HaulHubError> {
        let business = match self.businesses.find_by_user(owner).await? {
            Some(mut existing) => {
                existing.apply(update, now())?;
                existing
            }
            None => Business::create(owner.clone(), update)?,
        };
        let business = self.businesses.upsert(business).await?;
        tracing::info!(business_id = %business.id, "business profile saved");
        Ok(business)
    }

    /// The business owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when `owner` has no business, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn own_profile(&self, owner: &UserId) -> Result<Business, HaulHubError> {
        self.businesses.find_by_user(owner).await?.ok_or_else(|| {
            NotFoundError {
                entity: Entity::BusinessProfile,
                id: owner.to_string(),
            }
            .into()
        })
    }

    /// Record a review and fold its rating into the business average.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] for a rating outside 1–5,
    /// [`HaulHubError::NotFound`] when the business does not exist, or a
    /// storage error from a repository.
    #[tracing::instrument(skip(self, review), fields(rating = review.rating))]
    pub async fn add_review(
        &self,
        business_id: BusinessId,
        reviewer: &UserId,
        review: NewReview,
    ) -> Result<Review, HaulHubError> {
        let review = Review::new(
            business_id,
            reviewer.clone(),
            review.booking_id,
            review.rating,
            review.title,
            review.text,
        )?;
        self.get_business(business_id).await?;
        let review = self.reviews.create(review).await?;
        tracing::info!(review_id = %review.id, "review added");
        Ok(review)
    }

    /// Public reviews of a business, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_reviews(
        &self,
        business_id: BusinessId,
        page: PageRequest,
    ) -> Result<Page<Review>, HaulHubError> {
        self.reviews.list_public(business_id, page.window()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::InMemoryStore;
    use haulhub_domain::business::{PriceRange, ServiceOffering};
    use haulhub_domain::error::ValidationError;
    use haulhub_domain::geo::GeoPoint;
    use haulhub_domain::id::OfferingId;
    use haulhub_domain::search::SortBy;

    type Service = BusinessService<InMemoryStore, InMemoryStore>;

    fn make_service() -> (Service, InMemoryStore) {
        let store = InMemoryStore::default();
        (BusinessService::new(store.clone(), store.clone()), store)
    }

    fn owner() -> UserId {
        UserId::new("user_123")
    }

    fn update(name: &str) -> ProfileUpdate {
        ProfileUpdate {
            name: name.to_string(),
            business_type: "junk_removal".to_string(),
            location: Some(GeoPoint::new(39.80, -89.65).unwrap()),
            price_range: Some(PriceRange::Moderate),
            services: Some(vec![ServiceOffering {
                id: OfferingId::new(),
                category: "yard_cleanup".to_string(),
                name: "Yard Cleanup".to_string(),
                description: None,
                base_price: Some(120.0),
                price_unit: Some("per_job".to_string()),
                minimum_charge: None,
                estimated_duration_hours: Some(3.0),
            }]),
            ..ProfileUpdate::default()
        }
    }

    fn review(rating: i64) -> NewReview {
        NewReview {
            rating,
            booking_id: None,
            title: Some("Great".to_string()),
            text: None,
        }
    }

    #[tokio::test]
    async fn should_create_then_update_own_profile() {
        let (svc, _) = make_service();
        let created = svc
            .upsert_profile(&owner(), update("Green Cleanup"))
            .await
            .unwrap();

        let updated = svc
            .upsert_profile(
                &owner(),
                ProfileUpdate {
                    services: None,
                    ..update("Green Cleanup Services")
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.services.len(), 1);
        assert_eq!(
            svc.own_profile(&owner()).await.unwrap().name,
            "Green Cleanup Services"
        );
    }

    #[tokio::test]
    async fn should_report_missing_own_profile() {
        let (svc, _) = make_service();
        let result = svc.own_profile(&owner()).await;
        assert!(matches!(
            result,
            Err(HaulHubError::NotFound(NotFoundError { entity: Entity::BusinessProfile, .. }))
        ));
    }

    #[tokio::test]
    async fn should_update_rating_average_when_reviewed() {
        let (svc, store) = make_service();
        let business = svc
            .upsert_profile(&owner(), update("Green Cleanup"))
            .await
            .unwrap();

        svc.add_review(business.id, &UserId::new("user_456"), review(5))
            .await
            .unwrap();
        svc.add_review(business.id, &UserId::new("user_789"), review(4))
            .await
            .unwrap();

        let stored = store.business(business.id).unwrap();
        assert_eq!(stored.rating_count, 2);
        assert!((stored.rating - 4.5).abs() < f64::EPSILON);

        let profile = svc.profile(business.id).await.unwrap();
        assert_eq!(profile.reviews.len(), 2);
        assert_eq!(profile.reviews[0].rating, 4);
    }

    #[tokio::test]
    async fn should_reject_out_of_range_rating_before_lookup() {
        let (svc, _) = make_service();
        let result = svc
            .add_review(BusinessId::new(), &UserId::new("user_456"), review(6))
            .await;
        assert!(matches!(
            result,
            Err(HaulHubError::Validation(ValidationError::InvalidRating(6)))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_reviewing_unknown_business() {
        let (svc, _) = make_service();
        let result = svc
            .add_review(BusinessId::new(), &UserId::new("user_456"), review(5))
            .await;
        assert!(matches!(result, Err(HaulHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_page_reviews() {
        let (svc, _) = make_service();
        let business = svc
            .upsert_profile(&owner(), update("Green Cleanup"))
            .await
            .unwrap();
        for rating in 1..=5 {
            svc.add_review(business.id, &UserId::new("user_456"), review(rating))
                .await
                .unwrap();
        }

        let page = svc
            .list_reviews(business.id, PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_next(PageRequest::new(2, 2).window()));
    }

    #[tokio::test]
    async fn should_search_active_businesses() {
        let (svc, _) = make_service();
        svc.upsert_profile(&owner(), update("Green Cleanup"))
            .await
            .unwrap();
        svc.upsert_profile(&UserId::new("user_999"), update("Rapid Trash"))
            .await
            .unwrap();

        let page = svc
            .search(BusinessQuery {
                origin: Some(GeoPoint::new(39.7817, -89.6501).unwrap()),
                service_category: Some("yard_cleanup".to_string()),
                sort_by: SortBy::Rating,
                ..BusinessQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.items.iter().all(|b| b.distance.is_some()));
    }
}

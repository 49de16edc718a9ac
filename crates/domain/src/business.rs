//! Business: a service provider profile, its offerings and rating.

use serde::{Deserialize, Serialize};

use crate::error::{HaulHubError, ValidationError};
use crate::geo::GeoPoint;
use crate::id::{BusinessId, OfferingId, UserId};
use crate::time::{Timestamp, now};

/// Service radius applied when a business does not choose one.
pub const DEFAULT_SERVICE_RADIUS_MILES: u32 = 25;

wire_enum!(
    /// Relative price level shown in search results.
    PriceRange, field = "priceRange" {
        Budget => "$",
        Moderate => "$$",
        Premium => "$$$",
    }
);

impl PriceRange {
    /// Sort rank, cheapest first. Unknown ranges rank as moderate.
    #[must_use]
    pub fn rank(range: Option<Self>) -> u8 {
        match range {
            Some(Self::Budget) => 1,
            Some(Self::Moderate) | None => 2,
            Some(Self::Premium) => 3,
        }
    }
}

/// One priced service a business offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub id: OfferingId,
    pub category: String,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Option<f64>,
    pub price_unit: Option<String>,
    pub minimum_charge: Option<f64>,
    pub estimated_duration_hours: Option<f64>,
}

impl ServiceOffering {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name or category is blank or a
    /// price is negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let negative = [self.base_price, self.minimum_charge]
            .into_iter()
            .flatten()
            .any(|price| price < 0.0);
        if negative {
            return Err(ValidationError::InvalidField {
                field: "services",
                reason: "prices must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// A picture on the business profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPhoto {
    pub url: String,
    #[serde(rename = "type", default = "BusinessPhoto::default_kind")]
    pub kind: String,
    #[serde(default)]
    pub caption: Option<String>,
}

impl BusinessPhoto {
    fn default_kind() -> String {
        "gallery".to_string()
    }
}

/// Running average of review ratings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
}

impl RatingSummary {
    /// Fold one more rating into the average.
    #[must_use]
    pub fn with(self, rating: u8) -> Self {
        let count = self.count + 1;
        let total = self.average * f64::from(self.count) + f64::from(rating);
        Self {
            average: total / f64::from(count),
            count,
        }
    }
}

/// A service provider profile owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: BusinessId,
    pub user_id: UserId,
    pub name: String,
    pub business_type: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub business_phone: Option<String>,
    pub business_email: Option<String>,
    pub license_number: Option<String>,
    pub service_radius_miles: u32,
    pub location: Option<GeoPoint>,
    pub price_range: Option<PriceRange>,
    pub response_time_hours: Option<u32>,
    pub is_verified: bool,
    pub is_active: bool,
    pub subscription_tier: String,
    pub rating: f64,
    pub rating_count: u32,
    pub total_jobs_completed: u32,
    pub services: Vec<ServiceOffering>,
    pub photos: Vec<BusinessPhoto>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Profile fields a business owner edits.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub business_type: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub business_phone: Option<String>,
    pub business_email: Option<String>,
    pub license_number: Option<String>,
    pub service_radius_miles: Option<u32>,
    pub location: Option<GeoPoint>,
    pub price_range: Option<PriceRange>,
    pub response_time_hours: Option<u32>,
    /// `None` keeps existing offerings, `Some` replaces them.
    pub services: Option<Vec<ServiceOffering>>,
    /// `None` keeps existing photos, `Some` replaces them.
    pub photos: Option<Vec<BusinessPhoto>>,
}

impl Business {
    /// Create a fresh, unverified business for `owner` from a profile update.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] if invariants fail.
    pub fn create(owner: UserId, update: ProfileUpdate) -> Result<Self, HaulHubError> {
        let at = now();
        let mut business = Self {
            id: BusinessId::new(),
            user_id: owner,
            name: String::new(),
            business_type: String::new(),
            description: None,
            website_url: None,
            business_phone: None,
            business_email: None,
            license_number: None,
            service_radius_miles: DEFAULT_SERVICE_RADIUS_MILES,
            location: None,
            price_range: None,
            response_time_hours: None,
            is_verified: false,
            is_active: true,
            subscription_tier: "basic".to_string(),
            rating: 0.0,
            rating_count: 0,
            total_jobs_completed: 0,
            services: Vec::new(),
            photos: Vec::new(),
            created_at: at,
            updated_at: at,
        };
        business.apply(update, at)?;
        Ok(business)
    }

    /// Overwrite the editable profile fields.
    ///
    /// Optional contact fields are replaced wholesale, as a profile form would.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] if the result breaks an invariant.
    pub fn apply(&mut self, update: ProfileUpdate, at: Timestamp) -> Result<(), HaulHubError> {
        self.name = update.name;
        self.business_type = update.business_type;
        self.description = update.description;
        self.website_url = update.website_url;
        self.business_phone = update.business_phone;
        self.business_email = update.business_email;
        self.license_number = update.license_number;
        self.service_radius_miles = update
            .service_radius_miles
            .unwrap_or(DEFAULT_SERVICE_RADIUS_MILES);
        if update.location.is_some() {
            self.location = update.location;
        }
        if update.price_range.is_some() {
            self.price_range = update.price_range;
        }
        if update.response_time_hours.is_some() {
            self.response_time_hours = update.response_time_hours;
        }
        if let Some(services) = update.services {
            self.services = services;
        }
        if let Some(photos) = update.photos {
            self.photos = photos;
        }
        self.updated_at = at;
        self.validate()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] when the name or type is blank,
    /// the radius is zero, or an offering is invalid.
    pub fn validate(&self) -> Result<(), HaulHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("businessName").into());
        }
        if self.business_type.trim().is_empty() {
            return Err(ValidationError::MissingField("businessType").into());
        }
        if self.service_radius_miles == 0 {
            return Err(ValidationError::InvalidField {
                field: "serviceRadiusMiles",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        for offering in &self.services {
            offering.validate()?;
        }
        Ok(())
    }

    /// Current rating as a summary.
    #[must_use]
    pub fn rating_summary(&self) -> RatingSummary {
        RatingSummary {
            average: self.rating,
            count: self.rating_count,
        }
    }

    /// Whether any offering falls in `category`.
    #[must_use]
    pub fn offers(&self, category: &str) -> bool {
        self.services.iter().any(|s| s.category == category) || self.business_type == category
    }
}

//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point, checking latitude and longitude ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidField`] when a coordinate is out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::InvalidField {
                field: "lat",
                reason: "must be between -90 and 90".to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError::InvalidField {
                field: "lng",
                reason: "must be between -180 and 180".to_string(),
            });
        }
        Ok(Self { lat, lng })
    }

    /// Haversine distance to `other`, in miles.
    #[must_use]
    pub fn distance_miles(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_measure_zero_distance_to_itself() {
        let p = GeoPoint::new(39.7817, -89.6501).unwrap();
        assert!(p.distance_miles(&p) < 1e-9);
    }

    #[test]
    fn should_measure_springfield_to_chicago() {
        let springfield = GeoPoint::new(39.7817, -89.6501).unwrap();
        let chicago = GeoPoint::new(41.8781, -87.6298).unwrap();
        let miles = springfield.distance_miles(&chicago);
        assert!((miles - 179.0).abs() < 3.0, "got {miles}");
    }

    #[test]
    fn should_reject_latitude_out_of_range() {
        assert!(matches!(
            GeoPoint::new(91.0, 0.0),
            Err(ValidationError::InvalidField { field: "lat", .. })
        ));
    }
}

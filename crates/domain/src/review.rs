//! Review: a customer's rating of a business.

use serde::{Deserialize, Serialize};

use crate::error::{HaulHubError, ValidationError};
use crate::id::{BookingId, BusinessId, ReviewId, UserId};
use crate::time::{Timestamp, now};

/// A rating (1–5) with optional title and text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub business_id: BusinessId,
    pub reviewer_user_id: UserId,
    pub booking_id: Option<BookingId>,
    pub rating: u8,
    pub title: Option<String>,
    pub text: Option<String>,
    pub is_public: bool,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

impl Review {
    /// Create a public review.
    ///
    /// A review tied to a booking counts as verified.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRating`] unless `1 <= rating <= 5`.
    pub fn new(
        business_id: BusinessId,
        reviewer: UserId,
        booking_id: Option<BookingId>,
        rating: i64,
        title: Option<String>,
        text: Option<String>,
    ) -> Result<Self, HaulHubError> {
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or(ValidationError::InvalidRating(rating))?;
        Ok(Self {
            id: ReviewId::new(),
            business_id,
            reviewer_user_id: reviewer,
            booking_id,
            rating,
            title,
            text,
            is_public: true,
            is_verified: booking_id.is_some(),
            created_at: now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i64) -> Result<Review, HaulHubError> {
        Review::new(
            BusinessId::new(),
            UserId::new("user_456"),
            None,
            rating,
            Some("Excellent service!".to_string()),
            None,
        )
    }

    #[test]
    fn should_accept_ratings_one_through_five() {
        for rating in 1..=5 {
            assert_eq!(review(rating).unwrap().rating, u8::try_from(rating).unwrap());
        }
    }

    #[test]
    fn should_reject_rating_out_of_range() {
        for rating in [0, 6, -1, 300] {
            assert!(matches!(
                review(rating),
                Err(HaulHubError::Validation(ValidationError::InvalidRating(r))) if r == rating
            ));
        }
    }

    #[test]
    fn should_verify_review_linked_to_booking() {
        let review = Review::new(
            BusinessId::new(),
            UserId::new("user_456"),
            Some(BookingId::new()),
            4,
            None,
            None,
        )
        .unwrap();
        assert!(review.is_verified);
        assert!(review.is_public);
    }
}

//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::types::{ProductId, ReviewId, UserId};

/// A persisted review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Reviewer email, when the user record is still present.
    pub user_email: Option<String>,
    /// Whole stars, 1 to 5.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A review about to be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

impl NewReview {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    /// # Errors
    ///
    /// Returns [`ValidationError::Invalid`] when the star rating is outside 1..=5.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::Invalid {
                field: "rating",
                reason: format!(
                    "must be between {} and {} (got {})",
                    Self::MIN_RATING,
                    Self::MAX_RATING,
                    self.rating
                ),
            });
        }
        Ok(())
    }
}

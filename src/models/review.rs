use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: String,
    pub booking_id: String,
    pub client_id: String,
    pub therapist_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub is_verified: bool,
    pub helpful_count: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub client_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub rating: i64,
    pub comment: Option<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::invalid("rating must be between 1 and 5"));
        }
        Ok(())
    }
}

/// Arithmetic mean rounded to one decimal; zero when there are no ratings.
pub fn average_rating(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let mean = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

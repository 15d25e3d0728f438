use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::DomainError;
use super::page::Sort;
use super::user::UserSummary;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub user: UserSummary,
    pub product_id: Uuid,
    pub product_name: String,
    pub order_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingStats {
    pub average_rating: f64,
    pub total_reviews: i64,
}

impl RatingStats {
    /// Average rounded to one decimal place; zero when there are no reviews.
    pub fn from_totals(sum: i64, count: i64) -> Self {
        let average_rating = if count == 0 {
            0.0
        } else {
            ((sum as f64 / count as f64) * 10.0).round() / 10.0
        };
        Self {
            average_rating,
            total_reviews: count,
        }
    }
}

pub fn validate_rating(rating: i32) -> Result<i32, DomainError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(DomainError::field(
            "rating",
            format!("Rating must be between {} and {}.", MIN_RATING, MAX_RATING),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSortField {
    Rating,
    CreatedAt,
}

impl FromStr for ReviewSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(Self::Rating),
            "created_at" => Ok(Self::CreatedAt),
            _ => Err(()),
        }
    }
}

pub fn default_review_sort() -> Sort<ReviewSortField> {
    Sort::desc(ReviewSortField::CreatedAt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let stats = RatingStats::from_totals(14, 3);
        assert_eq!(stats.average_rating, 4.7);
        assert_eq!(stats.total_reviews, 3);
    }

    #[test]
    fn no_reviews_means_zero_average() {
        assert_eq!(RatingStats::from_totals(0, 0).average_rating, 0.0);
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert_eq!(validate_rating(5).unwrap(), 5);
    }
}

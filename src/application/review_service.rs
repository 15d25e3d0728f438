use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::page::Sort;
use crate::domain::ports::{ProductRepository, ReviewRepository};
use crate::domain::review::{validate_rating, RatingStats, Review, ReviewSortField};
use crate::domain::role::Permission;
use crate::domain::user::Caller;

#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    products: Arc<dyn ProductRepository>,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { reviews, products }
    }

    fn ensure_product(&self, product_id: Uuid) -> Result<(), DomainError> {
        self.products
            .find(product_id)?
            .map(|_| ())
            .ok_or(DomainError::NotFound("Product"))
    }

    /// Creates or replaces the caller's review; `true` when newly created.
    pub fn upsert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        rating: i32,
        review_text: Option<String>,
    ) -> Result<(Review, bool), DomainError> {
        let rating = validate_rating(rating)?;
        let text = review_text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.reviews.upsert(user_id, product_id, rating, text)
    }

    pub fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        let review = self.reviews.find(id)?.ok_or(DomainError::NotFound("Review"))?;
        caller.require_owner_or(review.user.id, Permission::ModerateContent)?;
        self.reviews.delete(id)?;
        Ok(())
    }

    pub fn for_product(&self, product_id: Uuid, sort: Sort<ReviewSortField>) -> Result<Vec<Review>, DomainError> {
        self.ensure_product(product_id)?;
        self.reviews.for_product(product_id, sort)
    }

    pub fn for_user(&self, user_id: Uuid) -> Result<Vec<Review>, DomainError> {
        self.reviews.for_user(user_id)
    }

    pub fn stats(&self, product_id: Uuid) -> Result<RatingStats, DomainError> {
        self.ensure_product(product_id)?;
        self.reviews.stats(product_id)
    }
}

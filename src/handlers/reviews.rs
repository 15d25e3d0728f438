use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::run;
use crate::auth::extractor::AuthUser;
use crate::domain::errors::DomainError;
use crate::domain::page::Sort;
use crate::domain::review::default_review_sort;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: Option<i32>,
    pub review_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewListParams {
    pub ordering: Option<String>,
}

/// PUT /reviews/add/{product_id}
///
/// Creates the caller's review (201) or replaces the existing one (200).
pub async fn upsert_review(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let ReviewRequest { rating, review_text } = body.into_inner();
    let rating = rating.ok_or_else(|| DomainError::field("rating", "This field is required."))?;
    let reviews = state.reviews.clone();
    let (review, created) =
        run(move || reviews.upsert(user.id, product_id, rating, review_text)).await?;

    Ok(if created {
        HttpResponse::Created().json(json!({
            "message": "Review added successfully",
            "review": review
        }))
    } else {
        HttpResponse::Ok().json(json!({
            "message": "Review updated successfully",
            "review": review
        }))
    })
}

/// DELETE /reviews/delete/{id}
pub async fn delete_review(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let reviews = state.reviews.clone();
    run(move || reviews.delete(&user.caller(), id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Review deleted successfully" })))
}

/// GET /reviews/product/{product_id}
pub async fn product_reviews(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ReviewListParams>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let sort = Sort::parse(query.ordering.as_deref(), default_review_sort());
    let reviews = state.reviews.clone();
    let list = run(move || reviews.for_product(product_id, sort)).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /reviews/user
pub async fn my_reviews(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let reviews = state.reviews.clone();
    let list = run(move || reviews.for_user(user.id)).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /reviews/product/{product_id}/stats
pub async fn product_stats(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let reviews = state.reviews.clone();
    let stats = run(move || reviews.stats(product_id)).await?;
    Ok(HttpResponse::Ok().json(stats))
}

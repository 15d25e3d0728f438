use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::run;
use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
pub async fn get_cart(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let cart = state.cart.clone();
    let current = run(move || cart.get(user.id)).await?;
    Ok(HttpResponse::Ok().json(current))
}

/// POST /cart/add
pub async fn add_item(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, AppError> {
    let AddItemRequest { product_id, quantity } = body.into_inner();
    let cart = state.cart.clone();
    let current = run(move || cart.add(user.id, product_id, quantity)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Product added to cart",
        "cart": current
    })))
}

/// PUT /cart/items/{id}
pub async fn update_item(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    let cart = state.cart.clone();
    let current = run(move || cart.update_item(user.id, item_id, quantity)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Cart updated",
        "cart": current
    })))
}

/// DELETE /cart/items/{id}
pub async fn remove_item(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let cart = state.cart.clone();
    let current = run(move || cart.remove_item(user.id, item_id)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Item removed from cart",
        "cart": current
    })))
}

/// DELETE /cart/clear
pub async fn clear_cart(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let cart = state.cart.clone();
    run(move || cart.clear(user.id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Cart cleared" })))
}

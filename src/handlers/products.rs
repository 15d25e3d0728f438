use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::run;
use crate::auth::extractor::AuthUser;
use crate::domain::errors::FieldErrors;
use crate::domain::page::{PageRequest, Sort};
use crate::domain::product::{NewProduct, ProductFilter, ProductPatch, ProductSortField};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsParams {
    pub search: Option<String>,
    pub price_lt: Option<BigDecimal>,
    pub price_gt: Option<BigDecimal>,
    pub stock_lt: Option<i32>,
    pub stock_gt: Option<i32>,
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CheckNameParams {
    #[serde(default)]
    pub name: String,
}

impl CreateProductRequest {
    fn into_new_product(self) -> Result<NewProduct, AppError> {
        let mut errors = FieldErrors::new();
        errors.require("name", self.name.as_deref());
        if self.price.is_none() {
            errors.add("price", "This field is required.");
        }
        if self.stock.is_none() {
            errors.add("stock", "This field is required.");
        }
        match (self.name, self.price, self.stock) {
            (Some(name), Some(price), Some(stock)) if errors.is_empty() => Ok(NewProduct {
                name: name.trim().to_string(),
                description: self.description,
                price,
                stock,
                images: self.images,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /products
pub async fn create_product(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = body.into_inner().into_new_product()?;
    let catalog = state.catalog.clone();
    let product = run(move || catalog.create(&user.caller(), product)).await?;
    Ok(HttpResponse::Created().json(product))
}

/// GET /products
///
/// Filtered, ordered and paginated listing with rating aggregates.
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = PageRequest::new(params.page, params.page_size);
    let filter = ProductFilter {
        search: params.search.filter(|s| !s.trim().is_empty()),
        price_lt: params.price_lt,
        price_gt: params.price_gt,
        stock_lt: params.stock_lt,
        stock_gt: params.stock_gt,
        sort: Sort::parse(
            params.ordering.as_deref(),
            Sort::desc(ProductSortField::CreatedAt),
        ),
    };
    let catalog = state.catalog.clone();
    let products = run(move || catalog.list(&filter, page)).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /products/{id}
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let catalog = state.catalog.clone();
    let product = run(move || catalog.get(id)).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// PUT /products/{id}
pub async fn update_product(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let patch = ProductPatch {
        name: body.name.map(|n| n.trim().to_string()),
        description: body.description,
        price: body.price,
        stock: body.stock,
        images: body.images,
    };
    let catalog = state.catalog.clone();
    let product = run(move || catalog.update(&user.caller(), id, patch)).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /products/{id}
pub async fn delete_product(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let catalog = state.catalog.clone();
    run(move || catalog.delete(&user.caller(), id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}

/// GET /products/check-name?name=
pub async fn check_name(
    state: web::Data<AppState>,
    query: web::Query<CheckNameParams>,
) -> Result<HttpResponse, AppError> {
    let name = query.into_inner().name;
    let catalog = state.catalog.clone();
    let exists = run(move || catalog.name_exists(&name)).await?;
    Ok(HttpResponse::Ok().json(json!({ "exists": exists })))
}

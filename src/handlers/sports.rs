use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::run;
use crate::auth::extractor::AuthUser;
use crate::domain::sport::SportGender;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSportRequest {
    #[serde(default)]
    pub name: String,
    pub gender: SportGender,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSportRequest {
    pub name: Option<String>,
    pub gender: Option<SportGender>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePositionRequest {
    #[serde(default)]
    pub name: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /sports
pub async fn list_sports(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let sports = state.sports.clone();
    let list = run(move || sports.list()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// POST /sports
pub async fn create_sport(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreateSportRequest>,
) -> Result<HttpResponse, AppError> {
    let CreateSportRequest { name, gender } = body.into_inner();
    let sports = state.sports.clone();
    let sport = run(move || sports.create(&user.caller(), &name, gender)).await?;
    Ok(HttpResponse::Created().json(sport))
}

/// GET /sports/{id}
pub async fn get_sport(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let sports = state.sports.clone();
    let sport = run(move || sports.get(id)).await?;
    Ok(HttpResponse::Ok().json(sport))
}

/// PUT /sports/{id}
pub async fn update_sport(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSportRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let UpdateSportRequest { name, gender } = body.into_inner();
    let sports = state.sports.clone();
    let sport = run(move || sports.update(&user.caller(), id, name.as_deref(), gender)).await?;
    Ok(HttpResponse::Ok().json(sport))
}

/// DELETE /sports/{id}
pub async fn delete_sport(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let sports = state.sports.clone();
    run(move || sports.delete(&user.caller(), id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Sport deleted successfully" })))
}

/// GET /sports/{id}/positions
pub async fn list_positions(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let sport_id = path.into_inner();
    let sports = state.sports.clone();
    let positions = run(move || sports.positions(sport_id)).await?;
    Ok(HttpResponse::Ok().json(positions))
}

/// POST /sports/{id}/positions
pub async fn create_position(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CreatePositionRequest>,
) -> Result<HttpResponse, AppError> {
    let sport_id = path.into_inner();
    let name = body.into_inner().name;
    let sports = state.sports.clone();
    let position = run(move || sports.create_position(&user.caller(), sport_id, &name)).await?;
    Ok(HttpResponse::Created().json(position))
}

/// GET /sports/positions/{id}
pub async fn get_position(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let sports = state.sports.clone();
    let position = run(move || sports.position(id)).await?;
    Ok(HttpResponse::Ok().json(position))
}

/// PUT /sports/positions/{id}
pub async fn update_position(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CreatePositionRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let name = body.into_inner().name;
    let sports = state.sports.clone();
    let position = run(move || sports.update_position(&user.caller(), id, &name)).await?;
    Ok(HttpResponse::Ok().json(position))
}

/// DELETE /sports/positions/{id}
pub async fn delete_position(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let sports = state.sports.clone();
    run(move || sports.delete_position(&user.caller(), id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

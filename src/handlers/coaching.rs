use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::run;
use crate::application::coaching_service::SessionBooking;
use crate::auth::extractor::AuthUser;
use crate::domain::coaching::SessionStatus;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SessionRequestBody {
    pub coach: Uuid,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    #[serde(default)]
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /coachingsessions
pub async fn request_session(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<SessionRequestBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let booking = SessionBooking {
        coach_id: body.coach,
        session_date: body.session_date,
        session_time: body.session_time,
        notes: body.notes,
    };
    let coaching = state.coaching.clone();
    let request = run(move || coaching.request(&user.caller(), booking)).await?;
    Ok(HttpResponse::Created().json(request))
}

/// GET /coachingsessions
pub async fn list_requests(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let coaching = state.coaching.clone();
    let list = run(move || coaching.list(&user.caller())).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /coachingsessions/{id}
pub async fn get_request(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let coaching = state.coaching.clone();
    let request = run(move || coaching.get(&user.caller(), id)).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// PUT /coachingsessions/{id}
pub async fn respond(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<RespondRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let answer: SessionStatus = body.into_inner().status.trim().parse()?;
    let coaching = state.coaching.clone();
    let request = run(move || coaching.respond(&user.caller(), id, answer)).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// DELETE /coachingsessions/{id}
pub async fn delete_request(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let coaching = state.coaching.clone();
    run(move || coaching.delete(&user.caller(), id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Session request deleted" })))
}

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::run;
use crate::application::account_service::Registration;
use crate::auth::extractor::AuthUser;
use crate::domain::errors::DomainError;
use crate::domain::page::PageRequest;
use crate::domain::role::Role;
use crate::domain::user::{AthleteProfileUpdate, ProfileUpdate, UserSearch};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct AthleteProfileRequest {
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height: Option<BigDecimal>,
    pub weight: Option<BigDecimal>,
    pub high_school: Option<String>,
    pub college: Option<String>,
    pub division: Option<String>,
    pub school_year: Option<String>,
    pub years_left_to_play: Option<i32>,
    pub sport: Option<Uuid>,
    pub position: Option<Uuid>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditProfileRequest {
    pub username: Option<String>,
    pub mobile_number: Option<String>,
    pub profile_picture: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub fcm_token: Option<String>,
    pub is_online: Option<bool>,
    pub notify_on_like: Option<bool>,
    pub notify_on_comment: Option<bool>,
    pub notify_on_chat: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileParams {
    pub user: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub role: Option<String>,
    pub name: Option<String>,
    pub weight: Option<BigDecimal>,
    pub height: Option<BigDecimal>,
    pub sport: Option<Uuid>,
    pub position: Option<Uuid>,
    pub division: Option<String>,
    pub eligibility: Option<i32>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

fn parse_role(raw: Option<&str>) -> Result<Role, DomainError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Err(DomainError::field("role", "This field is required.")),
        Some(raw) => raw
            .parse()
            .map_err(|_| DomainError::field("role", format!("\"{}\" is not a valid choice.", raw))),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let role = parse_role(body.role.as_deref())?;
    let registration = Registration {
        email: body.email,
        password: body.password,
        role,
        first_name: body.first_name,
        middle_name: body.middle_name,
        last_name: body.last_name,
    };
    let accounts = state.accounts.clone();
    let session = run(move || accounts.register(registration)).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "tokens": { "access": session.access }
    })))
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = body.into_inner();
    let accounts = state.accounts.clone();
    let session = run(move || accounts.login(&email, &password)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "token": { "access": session.access },
        "user": {
            "id": session.account.id,
            "email": session.account.email,
            "role": session.account.role,
        }
    })))
}

/// POST /auth/password/reset
pub async fn request_password_reset(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let email = body.into_inner().email;
    let accounts = state.accounts.clone();
    run(move || accounts.request_password_reset(&email)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password reset link sent to your email."
    })))
}

/// POST /auth/password/reset/{uid}/{token}
pub async fn reset_password(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let (uid, token) = path.into_inner();
    let user_id = Uuid::parse_str(&uid)
        .map_err(|_| AppError::BadRequest("Invalid or expired token".to_string()))?;
    let password = body.into_inner().password;
    let accounts = state.accounts.clone();
    run(move || accounts.reset_password(user_id, &token, &password)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password has been reset successfully."
    })))
}

/// PUT /auth/athlete/profile
pub async fn update_athlete_profile(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<AthleteProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let update = AthleteProfileUpdate {
        dob: body.dob,
        gender: body.gender,
        height: body.height,
        weight: body.weight,
        high_school: body.high_school,
        college: body.college,
        division: body.division,
        school_year: body.school_year,
        years_left_to_play: body.years_left_to_play,
        sport_id: body.sport,
        position_id: body.position,
        profile_picture: body.profile_picture,
    };
    let accounts = state.accounts.clone();
    let profile = run(move || accounts.update_athlete_profile(&user.account, update)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully",
        "data": profile
    })))
}

/// GET /users/profile
///
/// The caller's own profile unless `?user=<id>` names someone else.
pub async fn profile(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ProfileParams>,
) -> Result<HttpResponse, AppError> {
    let target = query.user.unwrap_or(user.id);
    let accounts = state.accounts.clone();
    let profile = run(move || accounts.profile(target)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /users/profile/edit
pub async fn update_profile(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<EditProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let update = ProfileUpdate {
        username: body.username,
        mobile_number: body.mobile_number,
        profile_picture: body.profile_picture,
        first_name: body.first_name,
        middle_name: body.middle_name,
        last_name: body.last_name,
        fcm_token: body.fcm_token,
        is_online: body.is_online,
        notify_on_like: body.notify_on_like,
        notify_on_comment: body.notify_on_comment,
        notify_on_chat: body.notify_on_chat,
    };
    let accounts = state.accounts.clone();
    let profile = run(move || accounts.update_profile(user.id, update)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully",
        "data": profile
    })))
}

/// POST /users/profile/update-password
pub async fn change_password(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let ChangePasswordRequest {
        current_password,
        new_password,
    } = body.into_inner();
    let accounts = state.accounts.clone();
    run(move || accounts.change_password(user.id, &current_password, &new_password)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password updated successfully"
    })))
}

/// GET /users/search
pub async fn search(
    _user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = PageRequest::new(params.page, params.page_size);
    let role = parse_role(params.role.as_deref())?;
    let search = UserSearch {
        role,
        name: params.name.filter(|n| !n.trim().is_empty()),
        weight: params.weight,
        height: params.height,
        sport_id: params.sport,
        position_id: params.position,
        division: params.division.filter(|d| !d.trim().is_empty()),
        eligibility: params.eligibility,
    };
    let accounts = state.accounts.clone();
    let results = run(move || accounts.search(search, page)).await?;
    Ok(HttpResponse::Ok().json(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_required_and_must_be_known() {
        assert_eq!(parse_role(Some("coach")).unwrap(), Role::Coach);
        assert!(matches!(
            parse_role(None),
            Err(DomainError::Validation(ref f)) if f.contains("role")
        ));
        assert!(matches!(
            parse_role(Some("wizard")),
            Err(DomainError::Validation(ref f)) if f.contains("role")
        ));
    }
}

use actix_web::{web, HttpResponse};
use serde_json::json;

use super::{run, PageParams};
use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /notifications
pub async fn list_notifications(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let page = query.request();
    let notifications = state.notifications.clone();
    let list = run(move || notifications.list(user.id, page)).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// POST /notifications/mark-as-read
pub async fn mark_all_read(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let notifications = state.notifications.clone();
    let updated = run(move || notifications.mark_all_read(user.id)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "All notifications marked as read",
        "updated": updated
    })))
}

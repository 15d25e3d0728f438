use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::run;
use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartChatRequest {
    #[serde(default)]
    pub participants: Vec<Uuid>,
}

/// GET /chats
pub async fn list_chats(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let chats = state.chats.clone();
    let list = run(move || chats.list(user.id)).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// POST /chats
///
/// 201 with a new chat, or 200 with the one the pair already shares.
pub async fn start_chat(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<StartChatRequest>,
) -> Result<HttpResponse, AppError> {
    let participants = body.into_inner().participants;
    let chats = state.chats.clone();
    let (chat, created) = run(move || chats.start(user.id, &participants)).await?;
    Ok(if created {
        HttpResponse::Created().json(chat)
    } else {
        HttpResponse::Ok().json(chat)
    })
}

/// GET /chats/{id}
pub async fn get_chat(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let chats = state.chats.clone();
    let chat = run(move || chats.get(user.id, id)).await?;
    Ok(HttpResponse::Ok().json(chat))
}

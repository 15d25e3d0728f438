use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::run;
use crate::auth::extractor::AuthUser;
use crate::domain::page::{PageRequest, Sort};
use crate::domain::podcast::{NewPodcast, PodcastFilter, PodcastPatch, PodcastSortField, ReactionChange};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreatePodcastRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub media_url: String,
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePodcastRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPodcastsParams {
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub is_liked: bool,
}

#[derive(Debug, Deserialize)]
pub struct PodcastCommentRequest {
    #[serde(default)]
    pub content: String,
}

// ── Podcasts ─────────────────────────────────────────────────────────────────

/// POST /podcasts
pub async fn create_podcast(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreatePodcastRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let podcast = NewPodcast {
        title: body.title.trim().to_string(),
        description: body.description,
        media_url: body.media_url.trim().to_string(),
        cover_image: body.cover_image,
    };
    let podcasts = state.podcasts.clone();
    let created = run(move || podcasts.create(&user.caller(), podcast)).await?;
    Ok(HttpResponse::Created().json(created))
}

/// GET /podcasts
pub async fn list_podcasts(
    _user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ListPodcastsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = PageRequest::new(params.page, params.page_size);
    let filter = PodcastFilter {
        search: params.search.filter(|s| !s.trim().is_empty()),
        sort: Sort::parse(
            params.ordering.as_deref(),
            Sort::desc(PodcastSortField::CreatedAt),
        ),
    };
    let podcasts = state.podcasts.clone();
    let list = run(move || podcasts.list(&filter, page)).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /podcasts/{id}
///
/// Counts as a view.
pub async fn get_podcast(
    _user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let podcasts = state.podcasts.clone();
    let podcast = run(move || podcasts.view(id)).await?;
    Ok(HttpResponse::Ok().json(podcast))
}

/// PUT /podcasts/{id}
pub async fn update_podcast(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePodcastRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let patch = PodcastPatch {
        title: body.title,
        description: body.description,
        media_url: body.media_url,
        cover_image: body.cover_image,
    };
    let podcasts = state.podcasts.clone();
    let podcast = run(move || podcasts.update(&user.caller(), id, patch)).await?;
    Ok(HttpResponse::Ok().json(podcast))
}

/// DELETE /podcasts/{id}
pub async fn delete_podcast(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let podcasts = state.podcasts.clone();
    run(move || podcasts.delete(&user.caller(), id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Podcast deleted successfully" })))
}

/// POST /podcasts/{id}/like
pub async fn react(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ReactionRequest>,
) -> Result<HttpResponse, AppError> {
    let podcast_id = path.into_inner();
    let is_liked = body.into_inner().is_liked;
    let podcasts = state.podcasts.clone();
    let change = run(move || podcasts.react(user.id, podcast_id, is_liked)).await?;
    let kind = if is_liked { "Like" } else { "Dislike" };

    Ok(match change {
        ReactionChange::Added => {
            HttpResponse::Created().json(json!({ "message": format!("{} added", kind) }))
        }
        ReactionChange::Removed => {
            HttpResponse::Ok().json(json!({ "message": format!("{} removed", kind) }))
        }
        ReactionChange::Switched => {
            HttpResponse::Ok().json(json!({ "message": format!("Reaction changed to {}", kind) }))
        }
    })
}

// ── Comments ─────────────────────────────────────────────────────────────────

/// GET /podcasts/{id}/comments
pub async fn list_comments(
    _user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let podcast_id = path.into_inner();
    let podcasts = state.podcasts.clone();
    let comments = run(move || podcasts.comments(podcast_id)).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /podcasts/{id}/comments
pub async fn add_comment(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PodcastCommentRequest>,
) -> Result<HttpResponse, AppError> {
    let podcast_id = path.into_inner();
    let content = body.into_inner().content;
    let podcasts = state.podcasts.clone();
    let comment = run(move || podcasts.add_comment(user.id, podcast_id, &content)).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// DELETE /podcasts/comments/{id}
pub async fn delete_comment(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let podcasts = state.podcasts.clone();
    run(move || podcasts.delete_comment(&user.caller(), id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Comment deleted successfully" })))
}

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{run, PageParams};
use crate::auth::extractor::AuthUser;
use crate::domain::page::PageRequest;
use crate::domain::social::{LikeToggle, NewPost, PostFilter, PostPatch, PostType, Privacy};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub user: Option<Uuid>,
    pub post_type: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub caption: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub post_type: Option<String>,
    pub location: Option<String>,
    pub music: Option<String>,
    pub privacy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub caption: Option<String>,
    pub media_urls: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub post: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub post: Uuid,
    #[serde(default)]
    pub content: String,
}

impl CreatePostRequest {
    fn into_new_post(self) -> Result<NewPost, AppError> {
        let post_type = match self.post_type.as_deref() {
            Some(raw) => raw.parse::<PostType>()?,
            None => PostType::Text,
        };
        let privacy = match self.privacy.as_deref() {
            Some(raw) => raw.parse::<Privacy>()?,
            None => Privacy::Public,
        };
        Ok(NewPost {
            caption: self.caption,
            media_urls: self.media_urls,
            post_type,
            location: self.location,
            music: self.music,
            privacy,
        })
    }
}

// ── Posts ────────────────────────────────────────────────────────────────────

/// GET /posts
///
/// Everyone else's posts by default; `?user=<id>` narrows to one author,
/// the caller included.
pub async fn feed(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<FeedParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = PageRequest::new(params.page, params.page_size);
    let filter = PostFilter {
        user: params.user,
        post_type: match params.post_type.as_deref().filter(|t| !t.is_empty()) {
            Some(raw) => Some(raw.parse::<PostType>()?),
            None => None,
        },
    };
    let social = state.social.clone();
    let posts = run(move || social.feed(user.id, &filter, page)).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /posts
pub async fn create_post(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let post = body.into_inner().into_new_post()?;
    let social = state.social.clone();
    let created = run(move || social.create_post(user.id, post)).await?;
    Ok(HttpResponse::Created().json(created))
}

/// GET /posts/{id}
pub async fn get_post(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let social = state.social.clone();
    let post = run(move || social.get_post(user.id, id)).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /posts/{id}
pub async fn update_post(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let UpdatePostRequest { caption, media_urls } = body.into_inner();
    let patch = PostPatch { caption, media_urls };
    let social = state.social.clone();
    let post = run(move || social.update_post(&user.caller(), id, patch)).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let social = state.social.clone();
    run(move || social.delete_post(&user.caller(), id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /posts/{id}/comments
pub async fn list_comments(
    _user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    let page = query.request();
    let social = state.social.clone();
    let comments = run(move || social.comments(post_id, page)).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /posts/likes
///
/// Toggles the caller's like: 201 when liked, 200 when withdrawn.
pub async fn toggle_like(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<LikeRequest>,
) -> Result<HttpResponse, AppError> {
    let post_id = body.into_inner().post;
    let social = state.social.clone();
    let toggle = run(move || social.toggle_like(user.id, post_id)).await?;
    Ok(match toggle {
        LikeToggle::Liked => HttpResponse::Created().json(json!({ "message": "Post liked" })),
        LikeToggle::Unliked => HttpResponse::Ok().json(json!({ "message": "Post unliked" })),
    })
}

/// POST /posts/comments
pub async fn add_comment(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CommentRequest>,
) -> Result<HttpResponse, AppError> {
    let CommentRequest { post, content } = body.into_inner();
    let social = state.social.clone();
    let comment = run(move || social.add_comment(user.id, post, &content)).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// PUT /posts/comments/{id}
pub async fn update_comment(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let content = body.into_inner().content;
    let social = state.social.clone();
    let comment = run(move || social.update_comment(&user.caller(), id, &content)).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// DELETE /posts/comments/{id}
pub async fn delete_comment(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let social = state.social.clone();
    run(move || social.delete_comment(&user.caller(), id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Follows ──────────────────────────────────────────────────────────────────

/// POST /relationships/follow/{user_id}
pub async fn follow(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let target = path.into_inner();
    let social = state.social.clone();
    run(move || social.follow(user.id, target)).await?;
    Ok(HttpResponse::Created().json(json!({ "message": "You are now following this user." })))
}

/// POST /relationships/unfollow/{user_id}
pub async fn unfollow(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let target = path.into_inner();
    let social = state.social.clone();
    run(move || social.unfollow(user.id, target)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "You have unfollowed this user." })))
}

/// GET /relationships/followers
pub async fn followers(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let page = query.request();
    let social = state.social.clone();
    let list = run(move || social.followers(user.id, page)).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /relationships/following
pub async fn following(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let page = query.request();
    let social = state.social.clone();
    let list = run(move || social.following(user.id, page)).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /relationships/is-following/{user_id}
pub async fn is_following(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let target = path.into_inner();
    let social = state.social.clone();
    let following = run(move || social.is_following(user.id, target)).await?;
    Ok(HttpResponse::Ok().json(json!({ "is_following": following })))
}

use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::posts::{CategoryFilter, CreatePost, CreateReply, PostView};
use crate::domain::vote::VoteKind;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use time::OffsetDateTime;
use uuid::Uuid;

/// Publishes a post that accepts interactions for the next ten minutes.
///
/// # Errors
/// Returns `AppError::Validation` if a field is invalid or a category does not exist.
pub async fn create(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePost>,
) -> Result<impl IntoResponse> {
    let draft = payload.try_into().map_err(AppError::Validation)?;
    let details = state.post_service.create_post(auth_user.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(PostView::project(details, OffsetDateTime::now_utc()))))
}

pub async fn list_recent(_auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let posts = state.post_service.list_recent().await?;
    Ok(Json(PostView::project_all(posts, OffsetDateTime::now_utc())))
}

/// # Errors
/// Returns `AppError::NotFound` if the post does not exist.
pub async fn get(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let details = state.post_service.get_post(post_id).await?;
    Ok(Json(PostView::project(details, OffsetDateTime::now_utc())))
}

/// # Errors
/// Returns `AppError::NotFound` if the post does not exist.
/// Returns `AppError::Expired` if the post no longer accepts replies.
/// Returns `AppError::Validation` if a live post receives an empty reply.
pub async fn reply(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateReply>,
) -> Result<impl IntoResponse> {
    let details = state.post_service.reply(auth_user.user_id, post_id, payload.content).await?;
    Ok(Json(PostView::project(details, OffsetDateTime::now_utc())))
}

pub async fn like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    vote(&state, auth_user, post_id, VoteKind::Like).await
}

pub async fn dislike(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    vote(&state, auth_user, post_id, VoteKind::Dislike).await
}

async fn vote(state: &AppState, auth_user: AuthUser, post_id: Uuid, kind: VoteKind) -> Result<Json<PostView>> {
    let details = state.post_service.vote(auth_user.user_id, post_id, kind).await?;
    Ok(Json(PostView::project(details, OffsetDateTime::now_utc())))
}

/// Lists a category's posts oldest first, optionally filtered by `?status=live|expired`.
pub async fn by_category(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Query(filter): Query<CategoryFilter>,
) -> Result<impl IntoResponse> {
    let posts = state.post_service.list_by_category(category_id, filter.status()).await?;
    Ok(Json(PostView::project_all(posts, OffsetDateTime::now_utc())))
}

/// # Errors
/// Returns `AppError::NotFound` if the category has no posts.
pub async fn most_active(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (details, score) = state.post_service.most_active(category_id).await?;
    Ok(Json(PostView::project(details, OffsetDateTime::now_utc()).with_engagement(score)))
}

pub async fn history(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let posts = state.post_service.history(category_id).await?;
    Ok(Json(PostView::project_all(posts, OffsetDateTime::now_utc())))
}

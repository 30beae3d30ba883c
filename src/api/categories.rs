use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::categories::{Category, CreateCategory};
use crate::error::Result;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

pub async fn list(_auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.category_service.list().await?;
    Ok(Json(categories.into_iter().map(Category::from).collect::<Vec<_>>()))
}

pub async fn create(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategory>,
) -> Result<impl IntoResponse> {
    let category = state.category_service.create(payload.name).await?;
    Ok((StatusCode::CREATED, Json(Category::from(category))))
}

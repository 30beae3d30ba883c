use crate::api::AppState;
use crate::api::schemas::accounts::{AuthToken, Login, Registered, Registration};
use crate::error::{AppError, Result};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Registration>,
) -> Result<impl IntoResponse> {
    let account = payload.try_into().map_err(AppError::Validation)?;
    let user = state.account_service.register(account).await?;
    Ok((StatusCode::CREATED, Json(Registered::from(user))))
}

/// Issues an access token. The token is echoed in the `auth-token` header for older clients.
pub async fn login(State(state): State<AppState>, Json(payload): Json<Login>) -> Result<impl IntoResponse> {
    let session = state.account_service.login(payload.email, payload.password).await?;
    let header = [("auth-token", session.token.clone())];
    Ok((header, Json(AuthToken::from(session))))
}

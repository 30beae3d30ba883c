use crate::api::AppState;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{Request, header, request::Parts},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header older clients send the raw token in.
const LEGACY_TOKEN_HEADER: &str = "auth-token";

#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).or_else(|| legacy_token(parts)).ok_or(AppError::AuthError)?;
        let user_id = state.auth_service.verify_token(token)?;

        tracing::Span::current().record("user_id", tracing::field::display(user_id));
        Ok(Self { user_id })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

fn legacy_token(parts: &Parts) -> Option<&str> {
    parts.headers.get(LEGACY_TOKEN_HEADER)?.to_str().ok()
}

/// Reuses an incoming `x-request-id` or mints a fresh UUID.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidOrHeader;

impl MakeRequestId for MakeRequestUuidOrHeader {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        if let Some(existing) = request.headers().get("x-request-id") {
            return Some(RequestId::new(existing.clone()));
        }
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

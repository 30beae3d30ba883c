use crate::domain::vote::VoteKind;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Authentication failed")]
    AuthError,
    #[error("Not found")]
    NotFound,
    #[error("This message has expired and no longer accepts interactions.")]
    Expired,
    #[error("You cannot {} your own message", .0.verb())]
    SelfInteraction(VoteKind),
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            Self::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            Self::Expired => {
                tracing::debug!("Interaction rejected: message expired");
                (StatusCode::FORBIDDEN, Self::Expired.to_string())
            }
            Self::SelfInteraction(kind) => {
                tracing::debug!(kind = %kind, "Interaction rejected: author voting on own message");
                (StatusCode::FORBIDDEN, Self::SelfInteraction(kind).to_string())
            }
            Self::Validation(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Conflict(msg) => {
                tracing::debug!(message = %msg, "Conflict");
                (StatusCode::CONFLICT, msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Expired.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::SelfInteraction(VoteKind::Like).into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Validation("bad".into()).into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("taken".into()).into_response().status(), StatusCode::CONFLICT);
        assert_eq!(AppError::AuthError.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(AppError::SelfInteraction(VoteKind::Like).to_string(), "You cannot like your own message");
        assert_eq!(AppError::SelfInteraction(VoteKind::Dislike).to_string(), "You cannot dislike your own message");
        assert_eq!(
            AppError::Expired.to_string(),
            "This message has expired and no longer accepts interactions."
        );
    }
}

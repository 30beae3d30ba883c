use crate::domain::auth_session::AuthSession;
use crate::domain::user::UserSummary;
use crate::services::account_service::NewAccount;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<Registration> for NewAccount {
    type Error = String;

    fn try_from(payload: Registration) -> Result<Self, Self::Error> {
        Self::new(payload.username, payload.email, payload.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registered {
    pub user_id: Uuid,
    pub username: String,
}

impl From<UserSummary> for Registered {
    fn from(user: UserSummary) -> Self {
        Self { user_id: user.id, username: user.username }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub auth_token: String,
    pub expires_at: i64,
}

impl From<AuthSession> for AuthToken {
    fn from(session: AuthSession) -> Self {
        Self { auth_token: session.token, expires_at: session.expires_at }
    }
}

use crate::domain::user::{User, UserSummary};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) created_at: OffsetDateTime,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
            password_hash: record.password_hash,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserSummaryRecord {
    pub(crate) id: Uuid,
    pub(crate) username: String,
}

impl From<UserSummaryRecord> for UserSummary {
    fn from(record: UserSummaryRecord) -> Self {
        Self { id: record.id, username: record.username }
    }
}

use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    #[allow(dead_code)]
    pub(crate) email: String,
    pub(crate) password_hash: String,
    #[allow(dead_code)]
    pub(crate) created_at: OffsetDateTime,
}

/// The public face of an account as embedded in posts, votes and replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub(crate) id: Uuid,
    pub(crate) username: String,
}

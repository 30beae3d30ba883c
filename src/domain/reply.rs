use crate::domain::user::UserSummary;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Reply {
    pub(crate) id: Uuid,
    pub(crate) author: UserSummary,
    pub(crate) content: String,
    pub(crate) created_at: OffsetDateTime,
}

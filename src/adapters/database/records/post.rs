use crate::domain::post::{Post, PostStatus};
use crate::domain::vote::VoteKind;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "post_status", rename_all = "lowercase")]
pub enum PostStatusRecord {
    Live,
    Expired,
}

impl From<PostStatusRecord> for PostStatus {
    fn from(record: PostStatusRecord) -> Self {
        match record {
            PostStatusRecord::Live => Self::Live,
            PostStatusRecord::Expired => Self::Expired,
        }
    }
}

impl From<PostStatus> for PostStatusRecord {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Live => Self::Live,
            PostStatus::Expired => Self::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "vote_kind", rename_all = "lowercase")]
pub enum VoteKindRecord {
    Like,
    Dislike,
}

impl From<VoteKindRecord> for VoteKind {
    fn from(record: VoteKindRecord) -> Self {
        match record {
            VoteKindRecord::Like => Self::Like,
            VoteKindRecord::Dislike => Self::Dislike,
        }
    }
}

impl From<VoteKind> for VoteKindRecord {
    fn from(kind: VoteKind) -> Self {
        match kind {
            VoteKind::Like => Self::Like,
            VoteKind::Dislike => Self::Dislike,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PostRecord {
    pub(crate) id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) status: PostStatusRecord,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) expires_at: OffsetDateTime,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            author_id: record.author_id,
            title: record.title,
            content: record.content,
            status: record.status.into(),
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

/// A category attached to a post, in the order the author listed them.
#[derive(Debug, sqlx::FromRow)]
pub struct PostCategoryRecord {
    pub(crate) post_id: Uuid,
    pub(crate) category_id: Uuid,
    pub(crate) name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct VoteRecord {
    pub(crate) post_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
    pub(crate) kind: VoteKindRecord,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ReplyRecord {
    pub(crate) id: Uuid,
    pub(crate) post_id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) author_username: String,
    pub(crate) content: String,
    pub(crate) created_at: OffsetDateTime,
}

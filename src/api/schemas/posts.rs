use crate::domain::category::Category;
use crate::domain::post::{PostDetails, PostDraft, PostStatus, TimeRemaining};
use crate::domain::reply::Reply;
use crate::domain::user::UserSummary;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub categories: Vec<Uuid>,
}

impl TryFrom<CreatePost> for PostDraft {
    type Error = String;

    fn try_from(payload: CreatePost) -> Result<Self, Self::Error> {
        Self::new(payload.title, payload.content, payload.categories)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateReply {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryFilter {
    pub status: Option<String>,
}

impl CategoryFilter {
    /// Unrecognised values mean "no filter".
    #[must_use]
    pub fn status(&self) -> Option<PostStatus> {
        self.status.as_deref().and_then(PostStatus::parse)
    }
}

#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
}

impl From<UserSummary> for UserRef {
    fn from(user: UserSummary) -> Self {
        Self { id: user.id, username: user.username }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

impl From<Category> for CategoryRef {
    fn from(category: Category) -> Self {
        Self { id: category.id, name: category.name }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: Uuid,
    pub content: String,
    pub author: UserRef,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Reply> for ReplyView {
    fn from(reply: Reply) -> Self {
        Self { id: reply.id, content: reply.content, author: reply.author.into(), created_at: reply.created_at }
    }
}

/// A post as returned to clients, including the time-remaining projection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub author: UserRef,
    pub categories: Vec<CategoryRef>,
    pub likes: Vec<UserRef>,
    pub dislikes: Vec<UserRef>,
    pub replies: Vec<ReplyView>,
    pub time_left_ms: i64,
    pub time_left_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement_score: Option<usize>,
}

impl PostView {
    #[must_use]
    pub fn project(details: PostDetails, now: OffsetDateTime) -> Self {
        let remaining = TimeRemaining::until(details.post.expires_at, now);
        let post = details.post;

        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            status: post.status.as_str(),
            created_at: post.created_at,
            expires_at: post.expires_at,
            author: details.author.into(),
            categories: details.categories.into_iter().map(Into::into).collect(),
            likes: details.likes.into_iter().map(Into::into).collect(),
            dislikes: details.dislikes.into_iter().map(Into::into).collect(),
            replies: details.replies.into_iter().map(Into::into).collect(),
            time_left_ms: remaining.millis,
            time_left_human: remaining.human,
            engagement_score: None,
        }
    }

    #[must_use]
    pub fn project_all(posts: Vec<PostDetails>, now: OffsetDateTime) -> Vec<Self> {
        posts.into_iter().map(|details| Self::project(details, now)).collect()
    }

    #[must_use]
    pub const fn with_engagement(mut self, score: usize) -> Self {
        self.engagement_score = Some(score);
        self
    }
}

use crate::domain::category::Category;
use crate::domain::reply::Reply;
use crate::domain::user::UserSummary;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// How long a post accepts interactions after it is published.
pub const POST_LIFETIME: Duration = Duration::minutes(10);

const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Live,
    Expired,
}

impl PostStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Expired => "expired",
        }
    }

    /// Parses a status filter. Unknown values yield `None`, which callers treat as "no filter".
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "live" => Some(Self::Live),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub(crate) id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) status: PostStatus,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) expires_at: OffsetDateTime,
}

impl Post {
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn author_id(&self) -> Uuid {
        self.author_id
    }

    #[must_use]
    pub const fn status(&self) -> PostStatus {
        self.status
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub const fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// True when the `live -> expired` transition is allowed to fire at `now`.
    ///
    /// Mirrors the predicate of the conditional update in the post repository.
    #[must_use]
    pub fn is_due_at(&self, now: OffsetDateTime) -> bool {
        self.status == PostStatus::Live && self.expires_at < now
    }
}

/// Which posts a `live -> expired` pass may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryScope {
    /// Every live post past its expiry (the periodic sweep).
    All,
    /// A single post (the on-access check).
    Single(Uuid),
}

/// Computes the fixed expiry instant for a post created at `created_at`.
#[must_use]
pub fn expiry_for(created_at: OffsetDateTime) -> OffsetDateTime {
    created_at + POST_LIFETIME
}

/// A validated but not yet authored post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) category_ids: Vec<Uuid>,
}

impl PostDraft {
    /// Validates the user-supplied fields. Duplicate category ids are collapsed.
    ///
    /// # Errors
    /// Returns a message describing the first invalid field.
    pub fn new(title: String, content: String, category_ids: Vec<Uuid>) -> Result<Self, String> {
        let title_len = title.chars().count();
        if !(3..=256).contains(&title_len) {
            return Err("\"title\" length must be between 3 and 256 characters".to_string());
        }
        if content.chars().count() < 3 {
            return Err("\"content\" length must be at least 3 characters long".to_string());
        }
        if category_ids.is_empty() {
            return Err("\"categories\" must contain at least 1 items".to_string());
        }

        let mut unique = Vec::with_capacity(category_ids.len());
        for id in category_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        Ok(Self { title, content, category_ids: unique })
    }

    #[must_use]
    pub fn authored_by(self, author_id: Uuid) -> NewPost {
        NewPost { author_id, title: self.title, content: self.content, category_ids: self.category_ids }
    }
}

/// Input for publishing a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category_ids: Vec<Uuid>,
}

/// Validates reply text.
///
/// # Errors
/// Returns a message if the content is empty.
pub fn validate_reply(content: String) -> Result<String, String> {
    if content.is_empty() {
        return Err("\"content\" is not allowed to be empty".to_string());
    }
    Ok(content)
}

/// A post together with everything a reader sees: author, categories, votes and replies.
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub post: Post,
    pub author: UserSummary,
    pub categories: Vec<Category>,
    pub likes: Vec<UserSummary>,
    pub dislikes: Vec<UserSummary>,
    pub replies: Vec<Reply>,
}

impl PostDetails {
    #[must_use]
    pub fn engagement_score(&self) -> usize {
        self.likes.len() + self.dislikes.len() + self.replies.len()
    }
}

/// Read-time projection of how long a post has left.
///
/// Derived from `expires_at` alone, so it can say "Expired" while the stored
/// status is still `live` until the next sweep or on-access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRemaining {
    pub millis: i64,
    pub human: String,
}

impl TimeRemaining {
    #[must_use]
    pub fn until(expires_at: OffsetDateTime, now: OffsetDateTime) -> Self {
        let left = (expires_at - now).whole_milliseconds();
        let left = i64::try_from(left).unwrap_or(if left > 0 { i64::MAX } else { i64::MIN });

        if left > 0 {
            Self { millis: left, human: format!("{} minutes remaining", left / MILLIS_PER_MINUTE) }
        } else {
            Self { millis: 0, human: "Expired".to_string() }
        }
    }
}

/// Returns the item with the highest score; on ties the earliest one wins.
pub fn most_active<T>(items: &[T], score: impl Fn(&T) -> usize) -> Option<&T> {
    let mut best: Option<(&T, usize)> = None;
    for item in items {
        let current = score(item);
        match best {
            Some((_, top)) if top >= current => {}
            _ => best = Some((item, current)),
        }
    }
    best.map(|(item, _)| item)
}

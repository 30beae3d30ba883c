use crate::adapters::database::DbPool;
use crate::adapters::database::category_repo::CategoryRepository;
use crate::adapters::database::post_repo::PostRepository;
use crate::adapters::database::reply_repo::ReplyRepository;
use crate::adapters::database::vote_repo::VoteRepository;
use crate::config::LifecycleConfig;
use crate::domain::post::{Post, PostDetails, PostDraft, PostStatus, most_active, validate_reply};
use crate::domain::vote::{VoteKind, ensure_not_author, next_vote};
use crate::error::{AppError, Result};
use crate::services::lifecycle_service::LifecycleService;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    created_total: Counter<u64>,
    votes_total: Counter<u64>,
    replies_total: Counter<u64>,
    rejected_total: Counter<u64>,
    page_size: Histogram<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("ephemeral-board");
        Self {
            created_total: meter
                .u64_counter("board_posts_created_total")
                .with_description("Total posts published")
                .build(),
            votes_total: meter
                .u64_counter("board_votes_total")
                .with_description("Like/dislike requests applied, labelled by kind and outcome")
                .build(),
            replies_total: meter.u64_counter("board_replies_total").with_description("Total replies posted").build(),
            rejected_total: meter
                .u64_counter("board_interactions_rejected_total")
                .with_description("Interactions rejected by the expiry gate or the self-vote rule")
                .build(),
            page_size: meter
                .u64_histogram("board_post_page_size")
                .with_description("Number of posts returned by list endpoints")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostService {
    pool: DbPool,
    repo: PostRepository,
    vote_repo: VoteRepository,
    reply_repo: ReplyRepository,
    category_repo: CategoryRepository,
    lifecycle: LifecycleService,
    config: LifecycleConfig,
    metrics: Metrics,
}

impl PostService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        repo: PostRepository,
        vote_repo: VoteRepository,
        reply_repo: ReplyRepository,
        category_repo: CategoryRepository,
        lifecycle: LifecycleService,
        config: LifecycleConfig,
    ) -> Self {
        Self { pool, repo, vote_repo, reply_repo, category_repo, lifecycle, config, metrics: Metrics::new() }
    }

    /// Publishes a post that expires ten minutes from now.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if any category does not exist.
    /// Returns `AppError::Database` if the post cannot be stored.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, draft),
        fields(author_id = %author_id, post_id = tracing::field::Empty)
    )]
    pub async fn create_post(&self, author_id: Uuid, draft: PostDraft) -> Result<PostDetails> {
        let mut tx = self.pool.begin().await?;

        let found = self.category_repo.count_existing(&mut tx, &draft.category_ids).await?;
        if usize::try_from(found).ok() != Some(draft.category_ids.len()) {
            return Err(AppError::Validation("One or more categories are invalid".to_string()));
        }

        let post = self.repo.create(&mut tx, &draft.authored_by(author_id), OffsetDateTime::now_utc()).await?;
        tracing::Span::current().record("post_id", tracing::field::display(post.id()));

        let details = self.details_of(&mut tx, post).await?;
        tx.commit().await?;

        tracing::info!("Post published");
        self.metrics.created_total.add(1, &[]);
        Ok(details)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if the post does not exist.
    #[tracing::instrument(err(level = "debug"), skip(self), fields(post_id = %post_id))]
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostDetails> {
        let mut conn = self.pool.acquire().await?;
        let post = self.repo.find_by_id(&mut conn, post_id).await?.ok_or(AppError::NotFound)?;
        self.details_of(&mut conn, post).await
    }

    /// The most recent posts, capped by the configured feed size.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err, skip(self))]
    pub async fn list_recent(&self) -> Result<Vec<PostDetails>> {
        let mut conn = self.pool.acquire().await?;
        let posts = self.repo.list_recent(&mut conn, self.config.feed_limit).await?;
        self.page(&mut conn, posts).await
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err, skip(self), fields(category_id = %category_id))]
    pub async fn list_by_category(&self, category_id: Uuid, status: Option<PostStatus>) -> Result<Vec<PostDetails>> {
        let mut conn = self.pool.acquire().await?;
        let posts = self.repo.list_by_category(&mut conn, category_id, status).await?;
        self.page(&mut conn, posts).await
    }

    /// Posts of a category that have already been observed as expired.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    pub async fn history(&self, category_id: Uuid) -> Result<Vec<PostDetails>> {
        self.list_by_category(category_id, Some(PostStatus::Expired)).await
    }

    /// The post in a category with the highest engagement score; the earliest post wins ties.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the category has no posts.
    #[tracing::instrument(err(level = "debug"), skip(self), fields(category_id = %category_id))]
    pub async fn most_active(&self, category_id: Uuid) -> Result<(PostDetails, usize)> {
        let posts = self.list_by_category(category_id, None).await?;
        let winner = most_active(&posts, PostDetails::engagement_score).ok_or(AppError::NotFound)?;
        let score = winner.engagement_score();
        Ok((winner.clone(), score))
    }

    /// Appends a reply to a live post.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the post does not exist.
    /// Returns `AppError::Expired` if the post has expired.
    /// Returns `AppError::Validation` if the content is empty; checked only once the post is known to be live.
    #[tracing::instrument(err(level = "debug"), skip(self, content), fields(post_id = %post_id, user_id = %actor_id))]
    pub async fn reply(&self, actor_id: Uuid, post_id: Uuid, content: String) -> Result<PostDetails> {
        self.ensure_live(post_id).await?;
        let content = validate_reply(content).map_err(AppError::Validation)?;

        let mut conn = self.pool.acquire().await?;
        self.reply_repo.create(&mut conn, post_id, actor_id, &content).await?;
        self.metrics.replies_total.add(1, &[]);

        let post = self.repo.find_by_id(&mut conn, post_id).await?.ok_or(AppError::NotFound)?;
        self.details_of(&mut conn, post).await
    }

    /// Applies a like or dislike, toggling it off when the account already holds the same vote.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the post does not exist.
    /// Returns `AppError::Expired` if the post has expired.
    /// Returns `AppError::SelfInteraction` if the actor wrote the post.
    #[tracing::instrument(
        err(level = "debug"),
        skip(self),
        fields(post_id = %post_id, user_id = %actor_id, kind = %kind)
    )]
    pub async fn vote(&self, actor_id: Uuid, post_id: Uuid, kind: VoteKind) -> Result<PostDetails> {
        let post = self.ensure_live(post_id).await?;
        if let Err(e) = ensure_not_author(post.author_id(), actor_id, kind) {
            self.metrics.rejected_total.add(1, &[KeyValue::new("reason", "self_interaction")]);
            return Err(e);
        }

        let mut tx = self.pool.begin().await?;
        self.vote_repo.lock_ballot(&mut tx, post_id, actor_id).await?;
        let current = self.vote_repo.find_for_update(&mut tx, post_id, actor_id).await?;
        let next = next_vote(current, kind);
        self.vote_repo.set(&mut tx, post_id, actor_id, next).await?;
        tx.commit().await?;

        let outcome = if next.is_some() { "applied" } else { "withdrawn" };
        self.metrics.votes_total.add(1, &[KeyValue::new("kind", kind.verb()), KeyValue::new("outcome", outcome)]);

        let mut conn = self.pool.acquire().await?;
        self.details_of(&mut conn, post).await
    }

    /// Gate in front of every mutating interaction: run the on-access expiry check, then
    /// re-read the post so the decision uses the freshest status.
    async fn ensure_live(&self, post_id: Uuid) -> Result<Post> {
        self.lifecycle.check_and_expire(post_id).await?;

        let mut conn = self.pool.acquire().await?;
        let post = self.repo.find_by_id(&mut conn, post_id).await?.ok_or(AppError::NotFound)?;

        if post.status() == PostStatus::Expired {
            self.metrics.rejected_total.add(1, &[KeyValue::new("reason", "expired")]);
            return Err(AppError::Expired);
        }
        Ok(post)
    }

    async fn details_of(&self, conn: &mut PgConnection, post: Post) -> Result<PostDetails> {
        self.repo.load_details(conn, vec![post]).await?.into_iter().next().ok_or(AppError::Internal)
    }

    async fn page(&self, conn: &mut PgConnection, posts: Vec<Post>) -> Result<Vec<PostDetails>> {
        let details = self.repo.load_details(conn, posts).await?;
        self.metrics.page_size.record(details.len() as u64, &[]);
        Ok(details)
    }
}

use crate::adapters::database::records::{
    PostCategoryRecord, PostRecord, PostStatusRecord, ReplyRecord, UserSummaryRecord, VoteKindRecord, VoteRecord,
};
use crate::domain::category::Category;
use crate::domain::post::{ExpiryScope, NewPost, Post, PostDetails, PostStatus, expiry_for};
use crate::domain::reply::Reply;
use crate::domain::user::UserSummary;
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

const POST_COLUMNS: &str = "p.id, p.author_id, p.title, p.content, p.status, p.created_at, p.expires_at";

#[derive(Clone, Debug, Default)]
pub struct PostRepository {}

impl PostRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Inserts a live post and links it to its categories.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if a category disappeared since it was checked.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, new_post), fields(author_id = %new_post.author_id))]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        new_post: &NewPost,
        created_at: OffsetDateTime,
    ) -> Result<Post> {
        let record = sqlx::query_as::<_, PostRecord>(
            r#"
            INSERT INTO posts (id, author_id, title, content, status, created_at, expires_at)
            VALUES ($1, $2, $3, $4, 'live', $5, $6)
            RETURNING id, author_id, title, content, status, created_at, expires_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(new_post.author_id)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(created_at)
        .bind(expiry_for(created_at))
        .fetch_one(&mut *conn)
        .await?;

        let linked = sqlx::query(
            r#"
            INSERT INTO post_categories (post_id, category_id, position)
            SELECT $1, t.category_id, (t.ord - 1)::int
            FROM UNNEST($2::uuid[]) WITH ORDINALITY AS t(category_id, ord)
            "#,
        )
        .bind(record.id)
        .bind(&new_post.category_ids)
        .execute(&mut *conn)
        .await;

        match linked {
            Ok(_) => Ok(record.into()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23503") => {
                // Foreign key violation: category_id does not exist
                Err(AppError::Validation("One or more categories are invalid".to_string()))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, post_id: Uuid) -> Result<Option<Post>> {
        let record = sqlx::query_as::<_, PostRecord>(&format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1"))
            .bind(post_id)
            .fetch_optional(conn)
            .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn exists(&self, conn: &mut PgConnection, post_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(conn)
            .await?;
        Ok(exists)
    }

    /// Flips every live post in `scope` whose expiry is strictly before `now` to expired.
    ///
    /// This is the only place the status ever changes. The filter and the write are a
    /// single statement, so a concurrent sweep and on-access check converge on the same
    /// row without a read-modify-write race. Returns the number of posts transitioned.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn expire_due(
        &self,
        conn: &mut PgConnection,
        now: OffsetDateTime,
        scope: ExpiryScope,
    ) -> Result<u64> {
        let post_id = match scope {
            ExpiryScope::All => None,
            ExpiryScope::Single(id) => Some(id),
        };

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET status = 'expired'
            WHERE status = 'live'
              AND expires_at < $1
              AND ($2::uuid IS NULL OR id = $2)
            "#,
        )
        .bind(now)
        .bind(post_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Most recent posts first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn list_recent(&self, conn: &mut PgConnection, limit: i64) -> Result<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p ORDER BY p.created_at DESC, p.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Posts filed under a category in publication order, optionally restricted to one status.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn list_by_category(
        &self,
        conn: &mut PgConnection,
        category_id: Uuid,
        status: Option<PostStatus>,
    ) -> Result<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN post_categories pc ON pc.post_id = p.id
            WHERE pc.category_id = $1
              AND ($2::post_status IS NULL OR p.status = $2)
            ORDER BY p.created_at ASC, p.id ASC
            "#
        ))
        .bind(category_id)
        .bind(status.map(PostStatusRecord::from))
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Attaches authors, categories, votes and replies to a page of posts, keeping the input order.
    ///
    /// # Errors
    /// Returns `AppError::Database` if any of the lookups fail.
    #[tracing::instrument(level = "debug", skip(self, conn, posts), fields(count = posts.len()))]
    pub(crate) async fn load_details(&self, conn: &mut PgConnection, posts: Vec<Post>) -> Result<Vec<PostDetails>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(Post::id).collect();
        let author_ids: Vec<Uuid> = posts.iter().map(Post::author_id).collect();

        let authors: HashMap<Uuid, UserSummary> =
            sqlx::query_as::<_, UserSummaryRecord>("SELECT id, username FROM users WHERE id = ANY($1)")
                .bind(&author_ids)
                .fetch_all(&mut *conn)
                .await?
                .into_iter()
                .map(|record| (record.id, record.into()))
                .collect();

        let mut categories: HashMap<Uuid, Vec<Category>> = HashMap::new();
        let category_records = sqlx::query_as::<_, PostCategoryRecord>(
            r#"
            SELECT pc.post_id, c.id AS category_id, c.name
            FROM post_categories pc
            JOIN categories c ON c.id = pc.category_id
            WHERE pc.post_id = ANY($1)
            ORDER BY pc.post_id, pc.position
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&mut *conn)
        .await?;
        for record in category_records {
            categories
                .entry(record.post_id)
                .or_default()
                .push(Category { id: record.category_id, name: record.name });
        }

        let mut likes: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
        let mut dislikes: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
        let vote_records = sqlx::query_as::<_, VoteRecord>(
            r#"
            SELECT v.post_id, v.user_id, u.username, v.kind
            FROM post_votes v
            JOIN users u ON u.id = v.user_id
            WHERE v.post_id = ANY($1)
            ORDER BY v.voted_at, v.user_id
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&mut *conn)
        .await?;
        for record in vote_records {
            let voter = UserSummary { id: record.user_id, username: record.username };
            let bucket = match record.kind {
                VoteKindRecord::Like => &mut likes,
                VoteKindRecord::Dislike => &mut dislikes,
            };
            bucket.entry(record.post_id).or_default().push(voter);
        }

        let mut replies: HashMap<Uuid, Vec<Reply>> = HashMap::new();
        let reply_records = sqlx::query_as::<_, ReplyRecord>(
            r#"
            SELECT r.id, r.post_id, r.author_id, u.username AS author_username, r.content, r.created_at
            FROM replies r
            JOIN users u ON u.id = r.author_id
            WHERE r.post_id = ANY($1)
            ORDER BY r.created_at, r.id
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&mut *conn)
        .await?;
        for record in reply_records {
            replies.entry(record.post_id).or_default().push(Reply {
                id: record.id,
                author: UserSummary { id: record.author_id, username: record.author_username },
                content: record.content,
                created_at: record.created_at,
            });
        }

        posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    tracing::error!(post_id = %post.id, "Post author missing");
                    AppError::Internal
                })?;
                Ok(PostDetails {
                    author,
                    categories: categories.remove(&post.id).unwrap_or_default(),
                    likes: likes.remove(&post.id).unwrap_or_default(),
                    dislikes: dislikes.remove(&post.id).unwrap_or_default(),
                    replies: replies.remove(&post.id).unwrap_or_default(),
                    post,
                })
            })
            .collect()
    }
}

use crate::error::Result;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct ReplyRepository {}

impl ReplyRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Appends a reply to a post and returns its id.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, content))]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO replies (id, post_id, author_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }
}

use crate::adapters::database::records::VoteKindRecord;
use crate::domain::vote::VoteKind;
use crate::error::Result;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct VoteRepository {}

impl VoteRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Serialises vote changes for one account on one post until the transaction ends.
    ///
    /// A row lock alone is not enough: there is nothing to lock before the first vote exists.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the lock cannot be taken.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn lock_ballot(&self, conn: &mut PgConnection, post_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text), hashtext($2::text))")
            .bind(post_id)
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Reads the vote an account holds on a post, locking the row for the rest of the transaction.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_for_update(
        &self,
        conn: &mut PgConnection,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<VoteKind>> {
        let kind = sqlx::query_scalar::<_, VoteKindRecord>(
            "SELECT kind FROM post_votes WHERE post_id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(kind.map(Into::into))
    }

    /// Stores the account's vote, or clears it when `vote` is `None`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the write fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn set(
        &self,
        conn: &mut PgConnection,
        post_id: Uuid,
        user_id: Uuid,
        vote: Option<VoteKind>,
    ) -> Result<()> {
        match vote {
            Some(kind) => {
                sqlx::query(
                    r#"
                    INSERT INTO post_votes (post_id, user_id, kind)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (post_id, user_id)
                    DO UPDATE SET kind = EXCLUDED.kind, voted_at = NOW()
                    "#,
                )
                .bind(post_id)
                .bind(user_id)
                .bind(VoteKindRecord::from(kind))
                .execute(conn)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM post_votes WHERE post_id = $1 AND user_id = $2")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(conn)
                    .await?;
            }
        }
        Ok(())
    }
}

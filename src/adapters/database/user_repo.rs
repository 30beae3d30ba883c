use crate::adapters::database::records::UserRecord;
use crate::domain::user::User;
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct UserRepository {}

impl UserRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `AppError::Conflict` if the email or username is already registered.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, email, password_hash))]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let result = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(conn)
        .await;

        match result {
            Ok(record) => Ok(record.into()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                if e.constraint() == Some("users_email_key") {
                    Err(AppError::Conflict("An account with this email already exists.".to_string()))
                } else {
                    Err(AppError::Conflict("This username is already taken.".to_string()))
                }
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, email))]
    pub(crate) async fn find_by_email(&self, conn: &mut PgConnection, email: &str) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }
}

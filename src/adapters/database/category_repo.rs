use crate::adapters::database::records::CategoryRecord;
use crate::domain::category::Category;
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct CategoryRepository {}

impl CategoryRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `AppError::Conflict` if the name is already taken.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn create(&self, conn: &mut PgConnection, name: &str) -> Result<Category> {
        let result = sqlx::query_as::<_, CategoryRecord>(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .fetch_one(conn)
        .await;

        match result {
            Ok(record) => Ok(record.into()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(AppError::Conflict("A category with this name already exists.".to_string()))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn list(&self, conn: &mut PgConnection) -> Result<Vec<Category>> {
        let records = sqlx::query_as::<_, CategoryRecord>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(conn)
            .await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Counts how many of the given ids name an existing category.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn count_existing(&self, conn: &mut PgConnection, ids: &[Uuid]) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(conn)
            .await?;
        Ok(count)
    }
}

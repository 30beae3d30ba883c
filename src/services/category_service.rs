use crate::adapters::database::DbPool;
use crate::adapters::database::category_repo::CategoryRepository;
use crate::domain::category::Category;
use crate::error::{AppError, Result};

#[derive(Clone, Debug)]
pub struct CategoryService {
    pool: DbPool,
    repo: CategoryRepository,
}

impl CategoryService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: CategoryRepository) -> Self {
        Self { pool, repo }
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err, skip(self))]
    pub async fn list(&self) -> Result<Vec<Category>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list(&mut conn).await
    }

    /// # Errors
    /// Returns `AppError::Validation` if the name is blank.
    /// Returns `AppError::Conflict` if the name is already taken.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn create(&self, name: String) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("\"name\" is not allowed to be empty".to_string()));
        }

        let mut conn = self.pool.acquire().await?;
        let category = self.repo.create(&mut conn, name).await?;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }
}

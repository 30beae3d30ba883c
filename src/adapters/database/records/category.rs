use crate::domain::category::Category;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct CategoryRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Self { id: record.id, name: record.name }
    }
}

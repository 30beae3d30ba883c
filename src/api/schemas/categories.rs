use crate::domain::category::Category as DomainCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl From<DomainCategory> for Category {
    fn from(category: DomainCategory) -> Self {
        Self { id: category.id, name: category.name }
    }
}

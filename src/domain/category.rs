use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub(crate) id: Uuid,
    pub(crate) name: String,
}

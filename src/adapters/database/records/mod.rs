pub mod category;
pub mod post;
pub mod user;

pub use category::CategoryRecord;
pub use post::{PostCategoryRecord, PostRecord, PostStatusRecord, ReplyRecord, VoteKindRecord, VoteRecord};
pub use user::{UserRecord, UserSummaryRecord};

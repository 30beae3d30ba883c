pub mod account_service;
pub mod auth_service;
pub mod category_service;
pub mod health_service;
pub mod lifecycle_service;
pub mod post_service;
pub mod rate_limit_service;

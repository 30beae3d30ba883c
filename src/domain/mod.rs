pub mod auth;
pub mod auth_session;
pub mod category;
pub mod post;
pub mod reply;
pub mod user;
pub mod vote;

pub mod api_key;
pub mod auth;
pub mod auth_session;
pub mod principal;
pub mod user;

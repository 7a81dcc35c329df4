//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::{
    api_key::ApiKey, auth::Auth, auth_session::AuthSession, principal::Principal, user::User,
};
pub use repository::{ApiKeyRepository, AuthRepository, AuthSessionRepository, UserRepository};

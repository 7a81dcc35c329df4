//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in `infra`.

use kernel::id::{ApiKeyId, UserId};
use uuid::Uuid;

use crate::domain::entity::{
    api_key::ApiKey, auth::Auth, auth_session::AuthSession, user::User,
};
use crate::domain::value_object::{email::Email, public_id::PublicId};
use crate::error::AuthResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// All users, newest first
    async fn list(&self) -> AuthResult<Vec<User>>;

    /// Persist profile, role, status, plan and login fields.
    /// The credit balance is not written; use `adjust_credits` or
    /// `set_credits`.
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Overwrite the balance (plan purchase resets the wallet)
    async fn set_credits(&self, user_id: &UserId, credits: i64) -> AuthResult<()>;

    /// Atomically add `delta` to the credit balance unless the result
    /// would be negative.
    ///
    /// Returns the new balance, `None` when the balance is insufficient,
    /// and `AuthError::UserNotFound` for an unknown user.
    async fn adjust_credits(&self, user_id: &UserId, delta: i64) -> AuthResult<Option<i64>>;
}

/// Credentials
#[trait_variant::make(AuthRepository: Send)]
pub trait LocalAuthRepository {
    async fn create(&self, auth: &Auth) -> AuthResult<()>;

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>>;

    async fn update(&self, auth: &Auth) -> AuthResult<()>;
}

#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Find a live session; a fingerprint mismatch is an error, not `None`
    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>>;

    /// Persist activity time and expiry
    async fn update(&self, session: &AuthSession) -> AuthResult<()>;

    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

#[trait_variant::make(ApiKeyRepository: Send)]
pub trait LocalApiKeyRepository {
    async fn create(&self, key: &ApiKey) -> AuthResult<()>;

    async fn find_by_id(&self, id: &ApiKeyId) -> AuthResult<Option<ApiKey>>;

    async fn find_by_hash(&self, key_hash: &str) -> AuthResult<Option<ApiKey>>;

    /// All keys, newest first
    async fn list(&self) -> AuthResult<Vec<ApiKey>>;

    async fn update(&self, key: &ApiKey) -> AuthResult<()>;

    /// Set `last_used_at` only, leaving status and hash untouched
    async fn record_usage(&self, id: &ApiKeyId) -> AuthResult<()>;
}

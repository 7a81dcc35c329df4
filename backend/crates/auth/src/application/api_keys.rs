//! API Key Use Cases
//!
//! Create, list, rotate and revoke. The clear secret leaves this module
//! only in the return value of `create` and `rotate`.

use std::sync::Arc;

use kernel::error::app_error::AppError;
use kernel::id::{ApiKeyId, UserId};

use crate::domain::entity::api_key::ApiKey;
use crate::domain::repository::ApiKeyRepository;
use crate::domain::value_object::api_key_secret::{ApiKeySecret, KeyEnvironment};
use crate::error::{AuthError, AuthResult};

const KEY_NAME_MAX_LENGTH: usize = 100;

/// A key together with its one-time visible secret
pub struct IssuedApiKey {
    pub key: ApiKey,
    pub secret: ApiKeySecret,
}

pub struct ApiKeyUseCase<K>
where
    K: ApiKeyRepository,
{
    key_repo: Arc<K>,
}

impl<K> ApiKeyUseCase<K>
where
    K: ApiKeyRepository,
{
    pub fn new(key_repo: Arc<K>) -> Self {
        Self { key_repo }
    }

    pub async fn create(
        &self,
        owner: UserId,
        name: &str,
        environment: KeyEnvironment,
    ) -> AuthResult<IssuedApiKey> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Name required").into());
        }
        if name.chars().count() > KEY_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {} characters",
                KEY_NAME_MAX_LENGTH
            ))
            .into());
        }

        let secret = ApiKeySecret::generate(environment);
        let key = ApiKey::issue(owner, name, &secret);
        self.key_repo.create(&key).await?;

        tracing::info!(key_id = %key.id, prefix = key.key_prefix(), "API key created");
        Ok(IssuedApiKey { key, secret })
    }

    pub async fn list(&self) -> AuthResult<Vec<ApiKey>> {
        self.key_repo.list().await
    }

    pub async fn rotate(&self, id: &ApiKeyId) -> AuthResult<IssuedApiKey> {
        let mut key = self.find(id).await?;
        if !key.is_active() {
            return Err(AuthError::ApiKeyRevoked);
        }

        let secret = ApiKeySecret::generate(key.environment);
        key.rotate(&secret);
        self.key_repo.update(&key).await?;

        tracing::info!(key_id = %key.id, "API key rotated");
        Ok(IssuedApiKey { key, secret })
    }

    /// Revoking an already revoked key is a no-op
    pub async fn revoke(&self, id: &ApiKeyId) -> AuthResult<()> {
        let mut key = self.find(id).await?;
        if key.is_active() {
            key.revoke();
            self.key_repo.update(&key).await?;
            tracing::info!(key_id = %key.id, "API key revoked");
        }
        Ok(())
    }

    async fn find(&self, id: &ApiKeyId) -> AuthResult<ApiKey> {
        self.key_repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::ApiKeyNotFound)
    }
}

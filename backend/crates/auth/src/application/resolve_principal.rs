//! Resolve Principal Use Case
//!
//! Turns request credentials into a `Principal`. Sessions resolve to the
//! signed-in user, API keys to a `service` principal acting for the key
//! owner. The user record is reloaded on every request so suspension
//! takes effect immediately.

use std::sync::Arc;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::entity::{auth_session::AuthSession, principal::Principal, user::User};
use crate::domain::repository::{ApiKeyRepository, AuthSessionRepository, UserRepository};
use crate::domain::value_object::api_key_secret::ApiKeySecret;
use crate::error::{AuthError, AuthResult};

pub struct ResolvePrincipalUseCase<U, S, K>
where
    U: UserRepository,
    S: AuthSessionRepository + Send + Sync + 'static,
    K: ApiKeyRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    key_repo: Arc<K>,
    config: Arc<AuthConfig>,
}

impl<U, S, K> ResolvePrincipalUseCase<U, S, K>
where
    U: UserRepository,
    S: AuthSessionRepository + Send + Sync + 'static,
    K: ApiKeyRepository + Send + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        key_repo: Arc<K>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            key_repo,
            config,
        }
    }

    pub async fn from_session(
        &self,
        session_token: &str,
        fingerprint_hash: &[u8],
    ) -> AuthResult<(Principal, AuthSession, User)> {
        let session = CheckSessionUseCase::new(self.session_repo.clone(), self.config.clone())
            .get_session(session_token, fingerprint_hash)
            .await?;

        let user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if !user.can_login() {
            return Err(AuthError::AccountSuspended);
        }

        Ok((Principal::from_session(&user), session, user))
    }

    pub async fn from_api_key(&self, raw_secret: &str) -> AuthResult<Principal> {
        let secret = ApiKeySecret::parse(raw_secret).ok_or(AuthError::ApiKeyInvalid)?;

        let key = self
            .key_repo
            .find_by_hash(&secret.hash())
            .await?
            .filter(|k| k.is_active())
            .ok_or(AuthError::ApiKeyInvalid)?;

        let owner = self
            .user_repo
            .find_by_id(&key.owner)
            .await?
            .ok_or(AuthError::ApiKeyInvalid)?;

        if !owner.can_login() {
            return Err(AuthError::AccountSuspended);
        }

        let key_id = key.id;
        let repo = self.key_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.record_usage(&key_id).await {
                tracing::warn!(error = %e, "Failed to record API key usage");
            }
        });

        Ok(Principal::from_api_key(&owner))
    }
}

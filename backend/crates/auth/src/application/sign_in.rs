//! Sign In Use Case
//!
//! Verifies credentials and opens a fingerprint-bound session.

use std::sync::Arc;

use platform::client::ClientFingerprint;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthRepository, AuthSessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

pub struct SignInOutput {
    pub session_token: String,
    pub expires_at_ms: i64,
    pub remember_me: bool,
    pub user: User,
}

pub struct SignInUseCase<U, A, S>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, A, S> SignInUseCase<U, A, S>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        fingerprint: ClientFingerprint,
    ) -> AuthResult<SignInOutput> {
        // Malformed and unknown emails look the same as a wrong password
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;
        let mut user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let mut auth = self
            .auth_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;

        if auth.is_locked() {
            return Err(AuthError::AccountLocked);
        }

        let raw_password = RawPassword::for_verification(input.password);
        if !auth.password_hash.verify(&raw_password, self.config.pepper()) {
            auth.record_failure();
            self.auth_repo.update(&auth).await?;
            if auth.is_locked() {
                tracing::warn!(public_id = %user.public_id, "Account locked after repeated failures");
            }
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_login() {
            return Err(AuthError::AccountSuspended);
        }

        if auth.login_failed_count > 0 {
            auth.reset_failures();
            self.auth_repo.update(&auth).await?;
        }

        user.record_login();
        self.user_repo.update(&user).await?;

        let ttl = chrono::Duration::from_std(self.config.session_ttl(input.remember_me))
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;
        let session = AuthSession::new(&user, input.remember_me, &fingerprint, ttl);
        self.session_repo.create(&session).await?;

        tracing::info!(
            public_id = %user.public_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token: session_token::sign(&self.config.session_secret, session.session_id),
            expires_at_ms: session.expires_at_ms,
            remember_me: input.remember_me,
            user,
        })
    }
}

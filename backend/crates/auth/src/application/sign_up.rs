//! Sign Up Use Case

use std::sync::Arc;

use kernel::error::app_error::AppError;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth::Auth, user::User};
use crate::domain::repository::{AuthRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

const NAME_MAX_LENGTH: usize = 100;

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub struct SignUpUseCase<U, A>
where
    U: UserRepository,
    A: AuthRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<U, A> SignUpUseCase<U, A>
where
    U: UserRepository,
    A: AuthRepository,
{
    pub fn new(user_repo: Arc<U>, auth_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            auth_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<User> {
        let email = Email::new(input.email)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Name is required").into());
        }
        if name.chars().count() > NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {} characters",
                NAME_MAX_LENGTH
            ))
            .into());
        }

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let raw_password = RawPassword::new(input.password)?;
        let password_hash =
            UserPassword::from_raw(&raw_password, self.config.pepper(), self.config.password_cost)?;

        let user = User::new(email, name);
        let auth = Auth::new(user.user_id, password_hash);

        self.user_repo.create(&user).await?;
        self.auth_repo.create(&auth).await?;

        tracing::info!(
            public_id = %user.public_id,
            email_domain = %user.email.domain(),
            "User signed up"
        );

        Ok(user)
    }
}

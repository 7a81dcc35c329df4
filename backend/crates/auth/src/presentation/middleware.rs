//! Auth Middleware
//!
//! `require_principal` resolves the caller and stores a [`Principal`] in
//! the request extensions. `require_role` gates a route on that
//! principal's role.

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::{extract_api_key, extract_bearer_token, extract_client_ip, extract_fingerprint};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::ResolvePrincipalUseCase;
use crate::application::config::AuthConfig;
use crate::domain::entity::principal::Principal;
use crate::domain::repository::{ApiKeyRepository, AuthSessionRepository, UserRepository};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: UserRepository + AuthSessionRepository + ApiKeyRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthMiddlewareState<R>
where
    R: UserRepository + AuthSessionRepository + ApiKeyRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

/// Session token from the cookie, falling back to `Authorization: Bearer`
pub fn session_token(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
    platform::cookie::extract_cookie(headers, &config.session_cookie_name)
        .or_else(|| extract_bearer_token(headers))
}

/// Resolve the caller from session cookie, Bearer token or API key
///
/// A present but invalid session token does not short-circuit: the API
/// key header is still tried.
pub async fn resolve_principal<R>(
    state: &AuthMiddlewareState<R>,
    headers: &HeaderMap,
    direct_ip: Option<std::net::IpAddr>,
) -> AuthResult<Principal>
where
    R: UserRepository + AuthSessionRepository + ApiKeyRepository + Send + Sync + 'static,
{
    let use_case = ResolvePrincipalUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let mut failure = AuthError::Unauthenticated;

    if let Some(token) = session_token(headers, &state.config) {
        let client_ip = extract_client_ip(headers, direct_ip);
        match extract_fingerprint(headers, client_ip) {
            Ok(fp) => match use_case.from_session(&token, &fp.hash).await {
                Ok((principal, _, _)) => return Ok(principal),
                Err(e) => failure = e,
            },
            Err(e) => failure = e.into(),
        }
    }

    if let Some(raw) = extract_api_key(headers) {
        return use_case.from_api_key(&raw).await;
    }

    Err(failure)
}

/// Middleware that requires an authenticated principal
pub async fn require_principal<R>(
    state: AuthMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: UserRepository + AuthSessionRepository + ApiKeyRepository + Send + Sync + 'static,
{
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    let principal = match resolve_principal(&state, req.headers(), direct_ip).await {
        Ok(p) => p,
        // Suspension and storage failures keep their own status
        Err(e @ (AuthError::AccountSuspended | AuthError::Database(_) | AuthError::Internal(_))) => {
            return Err(e.into_response());
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting unauthenticated request");
            return Err(AuthError::Unauthenticated.into_response());
        }
    };

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Middleware that requires the principal to hold at least `min`
///
/// Must run inside `require_principal`.
pub async fn require_role(
    min: UserRole,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(principal) = req.extensions().get::<Principal>() else {
        return Err(AuthError::Unauthenticated.into_response());
    };

    if !principal.has_role(min) {
        tracing::warn!(
            public_id = %principal.public_id,
            role = principal.role.code(),
            required = min.code(),
            "Insufficient role"
        );
        return Err(AuthError::Forbidden.into_response());
    }

    Ok(next.run(req).await)
}

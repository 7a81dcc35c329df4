//! HTTP Handlers

use axum::Json;
use axum::extract::{ConnectInfo, Extension, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use kernel::extract::AppJson;
use kernel::id::ApiKeyId;
use std::net::SocketAddr;
use std::sync::Arc;

use platform::client::{extract_client_ip, extract_fingerprint};

use crate::application::config::AuthConfig;
use crate::application::{
    ApiKeyUseCase, IssuedApiKey, ResolvePrincipalUseCase, SignInInput, SignInUseCase,
    SignOutUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::entity::principal::Principal;
use crate::domain::repository::{
    ApiKeyRepository, AuthRepository, AuthSessionRepository, UserRepository,
};
use crate::domain::value_object::api_key_secret::KeyEnvironment;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ApiKeyListResponse, ApiKeyResponse, CreateApiKeyRequest, IssuedApiKeyResponse,
    SessionStatusResponse, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
    UserResponse,
};
use crate::presentation::middleware::session_token;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    AppJson(req): AppJson<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<SignUpResponse>)>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let user = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user: UserResponse::from(&user),
        }),
    ))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    AppJson(req): AppJson<SignInRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));
    let fingerprint = extract_fingerprint(&headers, client_ip)?;

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            SignInInput {
                email: req.email,
                password: req.password,
                remember_me: req.remember_me,
            },
            fingerprint,
        )
        .await?;

    // Max-Age must match the server-side TTL
    let max_age = state.config.session_ttl(output.remember_me).as_secs();
    let cookie = state
        .config
        .cookie()
        .build_set_cookie(&output.session_token, max_age);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse {
            token: output.session_token,
            expires_at_ms: output.expires_at_ms,
            user: UserResponse::from(&output.user),
        }),
    ))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/signout
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    if let Some(token) = session_token(&headers, &state.config) {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        // Ignore errors - just clear the cookie
        if let Err(e) = use_case.execute(&token).await {
            tracing::debug!(error = %e, "Sign out with stale session token");
        }
    }

    let cookie = state.config.cookie().build_delete_cookie();
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)])
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/status
pub async fn session_status<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Json<SessionStatusResponse>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let Some(token) = session_token(&headers, &state.config) else {
        return Json(SessionStatusResponse::anonymous());
    };

    let client_ip = extract_client_ip(&headers, Some(addr.ip()));
    let Ok(fingerprint) = extract_fingerprint(&headers, client_ip) else {
        return Json(SessionStatusResponse::anonymous());
    };

    let use_case = ResolvePrincipalUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    match use_case.from_session(&token, &fingerprint.hash).await {
        Ok((_, session, user)) => Json(SessionStatusResponse {
            authenticated: true,
            user: Some(UserResponse::from(&user)),
            expires_at_ms: Some(session.expires_at_ms),
        }),
        Err(e) => {
            tracing::debug!(error = %e, "Session status check failed");
            Json(SessionStatusResponse::anonymous())
        }
    }
}

// ============================================================================
// Current User (requires authentication)
// ============================================================================

/// GET /api/auth/user
pub async fn current_user<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let user = UserRepository::find_by_id(state.repo.as_ref(), &principal.user_id)
        .await?
        .ok_or(AuthError::Unauthenticated)?;

    Ok(Json(UserResponse::from(&user)))
}

// ============================================================================
// API Keys (admin)
// ============================================================================

/// GET /api/admin/api-keys
pub async fn list_api_keys<R>(
    State(state): State<AuthAppState<R>>,
) -> AuthResult<Json<ApiKeyListResponse>>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let keys = ApiKeyUseCase::new(state.repo.clone()).list().await?;

    Ok(Json(ApiKeyListResponse {
        keys: keys.iter().map(ApiKeyResponse::from).collect(),
    }))
}

/// POST /api/admin/api-keys
pub async fn create_api_key<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
    AppJson(req): AppJson<CreateApiKeyRequest>,
) -> AuthResult<(StatusCode, Json<IssuedApiKeyResponse>)>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let environment = match req.environment.as_deref() {
        None => KeyEnvironment::Live,
        Some(code) => KeyEnvironment::from_code(code).ok_or_else(|| {
            AuthError::from(kernel::error::app_error::AppError::bad_request(format!(
                "Unknown key environment: {}",
                code
            )))
        })?,
    };

    let issued = ApiKeyUseCase::new(state.repo.clone())
        .create(principal.user_id, &req.name, environment)
        .await?;

    Ok((StatusCode::CREATED, Json(issued_response(issued))))
}

/// POST /api/admin/api-keys/{id}/rotate
pub async fn rotate_api_key<R>(
    State(state): State<AuthAppState<R>>,
    Path(id): Path<String>,
) -> AuthResult<Json<IssuedApiKeyResponse>>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let id = parse_key_id(&id)?;
    let issued = ApiKeyUseCase::new(state.repo.clone()).rotate(&id).await?;

    Ok(Json(issued_response(issued)))
}

/// DELETE /api/admin/api-keys/{id}
pub async fn revoke_api_key<R>(
    State(state): State<AuthAppState<R>>,
    Path(id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + ApiKeyRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let id = parse_key_id(&id)?;
    ApiKeyUseCase::new(state.repo.clone()).revoke(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_key_id(raw: &str) -> AuthResult<ApiKeyId> {
    raw.parse().map_err(|_| AuthError::ApiKeyNotFound)
}

fn issued_response(issued: IssuedApiKey) -> IssuedApiKeyResponse {
    IssuedApiKeyResponse {
        key: ApiKeyResponse::from(&issued.key),
        secret: issued.secret.expose().to_string(),
    }
}

//! Auth Routers

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{
    ApiKeyRepository, AuthRepository, AuthSessionRepository, UserRepository,
};
use crate::domain::value_object::user_role::UserRole;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_principal, require_role};

/// Routes mounted under `/api/auth`
pub fn auth_router<R>(repo: Arc<R>, config: Arc<AuthConfig>) -> Router
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
    let mw_state = AuthMiddlewareState::new(repo.clone(), config.clone());
    let state = AuthAppState { repo, config };

    let protected = Router::new()
        .route("/user", get(handlers::current_user::<R>))
        .route_layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            require_principal(mw_state.clone(), req, next)
        }));

    Router::new()
        .route("/signup", post(handlers::sign_up::<R>))
        .route("/signin", post(handlers::sign_in::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .route("/status", get(handlers::session_status::<R>))
        .merge(protected)
        .with_state(state)
}

/// Admin-only routes mounted under `/api/admin/api-keys`
pub fn api_key_router<R>(repo: Arc<R>, config: Arc<AuthConfig>) -> Router
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
    let mw_state = AuthMiddlewareState::new(repo.clone(), config.clone());
    let state = AuthAppState { repo, config };

    Router::new()
        .route(
            "/",
            get(handlers::list_api_keys::<R>).post(handlers::create_api_key::<R>),
        )
        .route("/{id}/rotate", post(handlers::rotate_api_key::<R>))
        .route("/{id}", delete(handlers::revoke_api_key::<R>))
        // Layers run bottom-up: principal first, then the role check
        .route_layer(middleware::from_fn(|req: Request<Body>, next: Next| {
            require_role(UserRole::Admin, req, next)
        }))
        .route_layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            require_principal(mw_state.clone(), req, next)
        }))
        .with_state(state)
}

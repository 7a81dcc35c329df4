//! Compliance Router

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    routing::{get, post, put},
};
use std::sync::Arc;

use auth::AuthConfig;
use auth::domain::value_object::user_role::UserRole;
use auth::presentation::middleware::{AuthMiddlewareState, require_principal, require_role};

use crate::application::config::ComplianceConfig;
use crate::infra::provider::Provider;
use crate::presentation::handlers::{self, AccountStore, ComplianceState, ComplianceStore};

/// Every compliance route, with full `/api/...` paths
pub fn compliance_router<R, U>(
    store: Arc<R>,
    users: Arc<U>,
    auth_config: Arc<AuthConfig>,
    provider: Arc<Provider>,
    config: Arc<ComplianceConfig>,
) -> Router
where
    R: ComplianceStore,
    U: AccountStore,
{
    let mw_state = AuthMiddlewareState::new(users.clone(), auth_config);
    let admin_mw_state = mw_state.clone();
    let state = ComplianceState {
        store,
        users,
        provider,
        config,
    };

    let protected = Router::new()
        .route(
            "/api/verifications",
            get(handlers::list_verifications::<R, U>).post(handlers::verify::<R, U>),
        )
        .route(
            "/api/verifications/{id}",
            get(handlers::get_verification::<R, U>),
        )
        .route("/api/reports", get(handlers::list_reports::<R, U>))
        .route("/api/reports/{id}", get(handlers::get_report::<R, U>))
        .route("/api/credits/balance", get(handlers::credit_balance::<R, U>))
        .route("/api/dashboard/stats", get(handlers::dashboard_stats::<R, U>))
        .route(
            "/api/payment/create-order",
            post(handlers::create_order::<R, U>),
        )
        .route("/api/payment/verify", post(handlers::verify_payment::<R, U>))
        .route("/api/bulk-upload", post(handlers::bulk_upload::<R, U>))
        .route("/api/bulk-upload/jobs", get(handlers::list_bulk_jobs::<R, U>))
        .route(
            "/api/bulk-upload/jobs/{id}",
            get(handlers::get_bulk_job::<R, U>),
        )
        .route_layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            require_principal(mw_state.clone(), req, next)
        }));

    let admin = Router::new()
        .route("/api/admin/users", get(handlers::admin_list_users::<R, U>))
        .route(
            "/api/admin/users/{id}/suspend",
            post(handlers::admin_suspend_user::<R, U>),
        )
        .route(
            "/api/admin/users/{id}/activate",
            post(handlers::admin_activate_user::<R, U>),
        )
        .route(
            "/api/admin/users/{id}/credits",
            post(handlers::admin_adjust_credits::<R, U>),
        )
        .route(
            "/api/admin/users/{id}/plan",
            put(handlers::admin_change_plan::<R, U>),
        )
        .route(
            "/api/admin/credit-changes",
            get(handlers::admin_credit_changes::<R, U>),
        )
        .route(
            "/api/admin/audit-logs",
            get(handlers::admin_audit_logs::<R, U>),
        )
        // Layers run bottom-up: principal first, then the role check
        .route_layer(middleware::from_fn(|req: Request<Body>, next: Next| {
            require_role(UserRole::Admin, req, next)
        }))
        .route_layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            require_principal(admin_mw_state.clone(), req, next)
        }));

    Router::new()
        .route("/api/plans", get(handlers::list_plans))
        .merge(protected)
        .merge(admin)
        .with_state(state)
}

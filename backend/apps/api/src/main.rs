//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request handling errors live in
//! the library crates.

mod config;

use std::sync::Arc;
use std::time::Duration;

use auth::domain::repository::{AuthRepository, UserRepository};
use auth::domain::value_object::email::Email;
use auth::infra::memory::DEMO_ADMIN_EMAIL;
use auth::{AuthConfig, MemoryAuthStore, PgAuthRepository, api_key_router, auth_router};
use axum::{
    Json, Router,
    body::Body,
    http::{self, Method, Request, header},
    middleware::{self, Next},
    routing::get,
};
use chrono::Utc;
use compliance::presentation::{AccountStore, ComplianceStore};
use compliance::{
    ComplianceConfig, MemoryComplianceStore, PgComplianceRepository, Provider, compliance_router,
    gateway_router,
};
use platform::password::HashCost;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,compliance=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;
    let auth_config = Arc::new(config.auth.clone());
    let compliance_config = Arc::new(config.compliance.clone());
    let provider = Arc::new(Provider::from_config(&compliance_config)?);

    let routes = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;
            tracing::info!("Migrations completed");

            // Startup cleanup: errors here should not prevent server startup
            let users = PgAuthRepository::new(pool.clone());
            match users.cleanup_expired().await {
                Ok(sessions) => {
                    tracing::info!(sessions_deleted = sessions, "Auth session cleanup completed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
                }
            }

            api_routes(
                Arc::new(PgComplianceRepository::new(pool)),
                Arc::new(users),
                auth_config,
                provider,
                compliance_config,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using seeded in-memory stores");
            let users = MemoryAuthStore::seeded(auth_config.pepper(), HashCost::Standard).await?;
            let admin = users
                .find_by_email(&Email::from_db(DEMO_ADMIN_EMAIL))
                .await?
                .ok_or_else(|| anyhow::anyhow!("seeded admin account is missing"))?;
            let store = MemoryComplianceStore::seeded(admin.user_id).await;

            api_routes(
                Arc::new(store),
                Arc::new(users),
                auth_config,
                provider,
                compliance_config,
            )
        }
    };

    let app = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .merge(routes)
        .merge(Router::new().nest("/api/gateway", gateway_router(&config.compliance)?));

    // Simulated latency for UI development against the mock store
    let app = match config.mock_latency {
        Some(latency) => {
            tracing::info!(latency_ms = latency.as_millis() as u64, "Simulated latency enabled");
            app.layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
                delayed(latency, req, next)
            }))
        }
        None => app,
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            http::HeaderName::from_static("x-api-key"),
        ]))
        .allow_credentials(true);

    let app = app.layer(TraceLayer::new_for_http()).layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Auth, API key and compliance routes over one pair of stores
fn api_routes<R, U>(
    store: Arc<R>,
    users: Arc<U>,
    auth_config: Arc<AuthConfig>,
    provider: Arc<Provider>,
    compliance_config: Arc<ComplianceConfig>,
) -> Router
where
    R: ComplianceStore,
    U: AccountStore + AuthRepository,
{
    Router::new()
        .nest("/api/auth", auth_router(users.clone(), auth_config.clone()))
        .nest(
            "/api/admin/api-keys",
            api_key_router(users.clone(), auth_config.clone()),
        )
        .merge(compliance_router(
            store,
            users,
            auth_config,
            provider,
            compliance_config,
        ))
}

async fn delayed(latency: Duration, req: Request<Body>, next: Next) -> axum::response::Response {
    tokio::time::sleep(latency).await;
    next.run(req).await
}

/// GET /
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Ravono Vendor Compliance API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

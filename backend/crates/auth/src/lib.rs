//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - In-memory and PostgreSQL implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, routers
//!
//! ## Features
//! - Sign up / sign in with email + password
//! - Server-side sessions carried by cookie or Bearer token
//! - API keys (`rv_live_...` / `rv_test_...`) acting as a `service` principal
//! - Credit balance and plan fields on the user record
//! - Role-based access (User, Manager, Admin)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B style policy)
//! - Session tokens signed with HMAC-SHA256
//! - Sessions bound to client fingerprint (User-Agent)
//! - Lockout after repeated failed sign-ins
//! - API key secrets stored only as SHA-256 hashes

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::principal::{Principal, PrincipalSource};
pub use error::{AuthError, AuthResult};
pub use infra::{MemoryAuthStore, PgAuthRepository};
pub use presentation::router::{api_key_router, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

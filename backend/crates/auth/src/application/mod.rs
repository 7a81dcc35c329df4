//! Application Layer
//!
//! Use cases and application services.

pub mod api_keys;
pub mod check_session;
pub mod config;
pub mod resolve_principal;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

pub use api_keys::{ApiKeyUseCase, IssuedApiKey};
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use resolve_principal::ResolvePrincipalUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};

//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary every crate in the workspace agrees on:
//! - the application error type and its HTTP mapping
//! - typed UUID identifiers for entities
//! - request extractors that reject with that error type (feature `axum`)
//!
//! Anything domain-specific (verification kinds, credits, roles)
//! belongs in its own crate, not here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;

//! Compliance Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, identifier value objects, repository and provider traits
//! - `application/` - Use cases: verification, billing, bulk upload, admin
//! - `infra/` - In-memory and PostgreSQL stores, Plan API and sandbox providers
//! - `presentation/` - HTTP handlers, DTOs, routers, gateway passthrough
//!
//! ## Features
//! - Vendor verification (GST, PAN, Aadhaar OTP, bank, CIN, DIN, passport)
//! - One credit per billable check, refunded when the provider fails
//! - Risk-scored reports valid for seven days
//! - Plan catalog and HMAC-signed payment confirmation
//! - CSV bulk upload processed in the background
//! - Admin console: suspension, credit adjustments, plan changes, audit log
//!
//! Callers are authenticated by the `auth` crate middleware; every handler
//! reads the `auth::Principal` from the request extensions.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{ComplianceConfig, PlanApiSettings};
pub use error::{ComplianceError, ComplianceResult};
pub use infra::{MemoryComplianceStore, PgComplianceRepository, Provider};
pub use presentation::{compliance_router, gateway_router};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

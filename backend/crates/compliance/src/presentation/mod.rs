//! Presentation Layer
//!
//! HTTP handlers, DTOs, routers, and the gateway passthrough.

pub mod dto;
pub mod gateway;
pub mod handlers;
pub mod router;

pub use gateway::gateway_router;
pub use handlers::{AccountStore, ComplianceState, ComplianceStore};
pub use router::compliance_router;

pub mod memory;
pub mod plan_api;
pub mod postgres;
pub mod provider;
pub mod sandbox;

pub use memory::MemoryComplianceStore;
pub use plan_api::PlanApiProvider;
pub use postgres::PgComplianceRepository;
pub use provider::Provider;
pub use sandbox::SandboxProvider;

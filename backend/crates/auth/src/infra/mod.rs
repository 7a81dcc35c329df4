//! Infrastructure Layer
//!
//! In-memory and PostgreSQL repository implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryAuthStore;
pub use postgres::PgAuthRepository;

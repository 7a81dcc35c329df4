pub mod audit_entry;
pub mod bulk_job;
pub mod credit_change;
pub mod payment_order;
pub mod plan;
pub mod report;
pub mod verification;

//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the provider
//! seam.

pub mod entity;
pub mod provider;
pub mod repository;
pub mod value_object;

pub use entity::{
    audit_entry::{AuditAction, AuditEntry, AuditTarget},
    bulk_job::{BulkJob, JobStatus, RowError},
    credit_change::CreditChange,
    payment_order::{OrderStatus, PaymentOrder},
    plan::Plan,
    report::{Report, ReportStatus},
    verification::{Verification, VerificationStatus},
};
pub use provider::{ProviderError, VerificationProvider};
pub use repository::{
    AuditRepository, BulkJobRepository, CreditChangeRepository, PaymentOrderRepository,
    ReportRepository, VerificationRepository,
};

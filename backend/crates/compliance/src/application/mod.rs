//! Application Layer
//!
//! Use cases and application services.

pub mod admin;
pub mod audit;
pub mod billing;
pub mod bulk_upload;
pub mod config;
pub mod dashboard;
pub mod reports;
pub mod verification;

pub use admin::AdminUseCase;
pub use audit::{AuditQueries, record_audit};
pub use billing::{BillingUseCase, PaymentOutcome, VerifyPaymentInput};
pub use bulk_upload::{BulkJobQueries, BulkSubmission, BulkUploadUseCase, CsvRow, parse_csv};
pub use config::{ComplianceConfig, PlanApiSettings};
pub use dashboard::{CreditBalance, DashboardStats, DashboardUseCase};
pub use reports::ReportQueries;
pub use verification::{VerificationQueries, VerifyInput, VerifyUseCase};

//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in `infra`.
//! Every list is owner-scoped where the entity has an owner, and newest
//! first.

use chrono::{DateTime, Utc};
use kernel::id::{BulkJobId, ReportId, UserId, VerificationId};

use crate::domain::entity::{
    audit_entry::{AuditAction, AuditEntry},
    bulk_job::BulkJob,
    credit_change::CreditChange,
    payment_order::PaymentOrder,
    report::Report,
    verification::Verification,
};
use crate::domain::value_object::VerificationKind;
use crate::error::ComplianceResult;

#[trait_variant::make(VerificationRepository: Send)]
pub trait LocalVerificationRepository {
    async fn create(&self, verification: &Verification) -> ComplianceResult<()>;

    async fn find_by_id(&self, id: &VerificationId) -> ComplianceResult<Option<Verification>>;

    /// Persist result, status and report link
    async fn update(&self, verification: &Verification) -> ComplianceResult<()>;

    async fn list_by_owner(
        &self,
        owner: &UserId,
        kind: Option<VerificationKind>,
    ) -> ComplianceResult<Vec<Verification>>;

    async fn count_by_owner_since(
        &self,
        owner: &UserId,
        since: DateTime<Utc>,
    ) -> ComplianceResult<u64>;
}

#[trait_variant::make(ReportRepository: Send)]
pub trait LocalReportRepository {
    async fn create(&self, report: &Report) -> ComplianceResult<()>;

    async fn find_by_id(&self, id: &ReportId) -> ComplianceResult<Option<Report>>;

    async fn list_by_owner(&self, owner: &UserId) -> ComplianceResult<Vec<Report>>;
}

#[trait_variant::make(BulkJobRepository: Send)]
pub trait LocalBulkJobRepository {
    async fn create(&self, job: &BulkJob) -> ComplianceResult<()>;

    async fn find_by_id(&self, id: &BulkJobId) -> ComplianceResult<Option<BulkJob>>;

    /// Persist status, counters, errors and report ids
    async fn update(&self, job: &BulkJob) -> ComplianceResult<()>;

    async fn list_by_owner(&self, owner: &UserId) -> ComplianceResult<Vec<BulkJob>>;
}

#[trait_variant::make(PaymentOrderRepository: Send)]
pub trait LocalPaymentOrderRepository {
    async fn create(&self, order: &PaymentOrder) -> ComplianceResult<()>;

    async fn find_by_id(&self, order_id: &str) -> ComplianceResult<Option<PaymentOrder>>;

    /// Move a `created` order to `paid`.
    ///
    /// Returns `false` when the order was already paid, so concurrent
    /// verifications of one order upgrade the plan only once.
    async fn mark_paid(&self, order: &PaymentOrder) -> ComplianceResult<bool>;

    /// Return a paid order to `created` when the plan upgrade behind it
    /// could not be applied, so the payment can be verified again.
    async fn reopen(&self, order_id: &str) -> ComplianceResult<()>;
}

#[trait_variant::make(CreditChangeRepository: Send)]
pub trait LocalCreditChangeRepository {
    async fn create(&self, change: &CreditChange) -> ComplianceResult<()>;

    async fn list(&self) -> ComplianceResult<Vec<CreditChange>>;
}

#[trait_variant::make(AuditRepository: Send)]
pub trait LocalAuditRepository {
    async fn record(&self, entry: &AuditEntry) -> ComplianceResult<()>;

    async fn list(
        &self,
        action: Option<AuditAction>,
        limit: usize,
    ) -> ComplianceResult<Vec<AuditEntry>>;
}

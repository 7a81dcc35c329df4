//! In-Memory Repository
//!
//! Process-wide store used when no database is configured and in tests.
//! Every compliance repository trait is implemented on one
//! `MemoryComplianceStore` behind a single `tokio::sync::RwLock`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kernel::id::{BulkJobId, ReportId, UserId, VerificationId};
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entity::{
    audit_entry::{AuditAction, AuditEntry},
    bulk_job::BulkJob,
    credit_change::CreditChange,
    payment_order::{OrderStatus, PaymentOrder},
    report::Report,
    verification::{Verification, VerificationStatus},
};
use crate::domain::repository::{
    AuditRepository, BulkJobRepository, CreditChangeRepository, PaymentOrderRepository,
    ReportRepository, VerificationRepository,
};
use crate::domain::value_object::VerificationKind;
use crate::error::{ComplianceError, ComplianceResult};

#[derive(Default)]
struct State {
    verifications: HashMap<VerificationId, Verification>,
    reports: HashMap<ReportId, Report>,
    jobs: HashMap<BulkJobId, BulkJob>,
    orders: HashMap<String, PaymentOrder>,
    /// Append-only, oldest first
    credit_changes: Vec<CreditChange>,
    /// Append-only, oldest first
    audit: Vec<AuditEntry>,
}

#[derive(Clone, Default)]
pub struct MemoryComplianceStore {
    state: Arc<RwLock<State>>,
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

impl MemoryComplianceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding a completed GST check and a pending PAN check for
    /// `owner` (the demo admin)
    pub async fn seeded(owner: UserId) -> Self {
        let store = Self::new();
        let now = Utc::now();

        let gst = Verification {
            id: VerificationId::new(),
            owner,
            kind: VerificationKind::Gst,
            vendor_name: Some("ACME Corp".to_string()),
            payload: json!({ "gstin": "27AABCU9603R1ZX" }),
            result: json!({
                "status": "success",
                "details": { "legal_name": "ACME Corp", "status": "Active" }
            }),
            status: VerificationStatus::Completed,
            report_id: None,
            created_at: now - Duration::days(1),
            updated_at: now - Duration::days(1),
        };
        let pan = Verification {
            id: VerificationId::new(),
            owner,
            kind: VerificationKind::Pan,
            vendor_name: None,
            payload: json!({ "pan": "ABCDE1234F" }),
            result: serde_json::Value::Null,
            status: VerificationStatus::Processing,
            report_id: None,
            created_at: now,
            updated_at: now,
        };

        {
            let mut state = store.state.write().await;
            state.verifications.insert(gst.id, gst);
            state.verifications.insert(pan.id, pan);
        }

        tracing::info!("Seeded in-memory compliance store with sample verifications");
        store
    }
}

// ============================================================================
// Verification Repository Implementation
// ============================================================================

impl VerificationRepository for MemoryComplianceStore {
    async fn create(&self, verification: &Verification) -> ComplianceResult<()> {
        let mut state = self.state.write().await;
        state
            .verifications
            .insert(verification.id, verification.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &VerificationId) -> ComplianceResult<Option<Verification>> {
        Ok(self.state.read().await.verifications.get(id).cloned())
    }

    async fn update(&self, verification: &Verification) -> ComplianceResult<()> {
        let mut state = self.state.write().await;
        let existing = state
            .verifications
            .get_mut(&verification.id)
            .ok_or(ComplianceError::VerificationNotFound)?;
        *existing = verification.clone();
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        kind: Option<VerificationKind>,
    ) -> ComplianceResult<Vec<Verification>> {
        let state = self.state.read().await;
        let items = state
            .verifications
            .values()
            .filter(|v| &v.owner == owner && kind.is_none_or(|k| v.kind == k))
            .cloned()
            .collect();
        Ok(newest_first(items, |v| v.created_at))
    }

    async fn count_by_owner_since(
        &self,
        owner: &UserId,
        since: DateTime<Utc>,
    ) -> ComplianceResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .verifications
            .values()
            .filter(|v| &v.owner == owner && v.created_at >= since)
            .count() as u64)
    }
}

// ============================================================================
// Report Repository Implementation
// ============================================================================

impl ReportRepository for MemoryComplianceStore {
    async fn create(&self, report: &Report) -> ComplianceResult<()> {
        self.state
            .write()
            .await
            .reports
            .insert(report.id, report.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ReportId) -> ComplianceResult<Option<Report>> {
        Ok(self.state.read().await.reports.get(id).cloned())
    }

    async fn list_by_owner(&self, owner: &UserId) -> ComplianceResult<Vec<Report>> {
        let state = self.state.read().await;
        let items = state
            .reports
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect();
        Ok(newest_first(items, |r| r.created_at))
    }
}

// ============================================================================
// Bulk Job Repository Implementation
// ============================================================================

impl BulkJobRepository for MemoryComplianceStore {
    async fn create(&self, job: &BulkJob) -> ComplianceResult<()> {
        self.state.write().await.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &BulkJobId) -> ComplianceResult<Option<BulkJob>> {
        Ok(self.state.read().await.jobs.get(id).cloned())
    }

    async fn update(&self, job: &BulkJob) -> ComplianceResult<()> {
        let mut state = self.state.write().await;
        let existing = state
            .jobs
            .get_mut(&job.id)
            .ok_or(ComplianceError::JobNotFound)?;
        *existing = job.clone();
        Ok(())
    }

    async fn list_by_owner(&self, owner: &UserId) -> ComplianceResult<Vec<BulkJob>> {
        let state = self.state.read().await;
        let items = state
            .jobs
            .values()
            .filter(|j| &j.owner == owner)
            .cloned()
            .collect();
        Ok(newest_first(items, |j| j.created_at))
    }
}

// ============================================================================
// Payment Order Repository Implementation
// ============================================================================

impl PaymentOrderRepository for MemoryComplianceStore {
    async fn create(&self, order: &PaymentOrder) -> ComplianceResult<()> {
        self.state
            .write()
            .await
            .orders
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, order_id: &str) -> ComplianceResult<Option<PaymentOrder>> {
        Ok(self.state.read().await.orders.get(order_id).cloned())
    }

    async fn mark_paid(&self, order: &PaymentOrder) -> ComplianceResult<bool> {
        let mut state = self.state.write().await;
        let existing = state
            .orders
            .get_mut(&order.id)
            .ok_or(ComplianceError::OrderNotFound)?;
        if existing.status == OrderStatus::Paid {
            return Ok(false);
        }
        existing.status = OrderStatus::Paid;
        existing.payment_id = order.payment_id.clone();
        existing.paid_at = order.paid_at;
        Ok(true)
    }

    async fn reopen(&self, order_id: &str) -> ComplianceResult<()> {
        let mut state = self.state.write().await;
        let existing = state
            .orders
            .get_mut(order_id)
            .ok_or(ComplianceError::OrderNotFound)?;
        existing.status = OrderStatus::Created;
        existing.payment_id = None;
        existing.paid_at = None;
        Ok(())
    }
}

// ============================================================================
// Credit Change Repository Implementation
// ============================================================================

impl CreditChangeRepository for MemoryComplianceStore {
    async fn create(&self, change: &CreditChange) -> ComplianceResult<()> {
        self.state.write().await.credit_changes.push(change.clone());
        Ok(())
    }

    async fn list(&self) -> ComplianceResult<Vec<CreditChange>> {
        let state = self.state.read().await;
        Ok(state.credit_changes.iter().rev().cloned().collect())
    }
}

// ============================================================================
// Audit Repository Implementation
// ============================================================================

impl AuditRepository for MemoryComplianceStore {
    async fn record(&self, entry: &AuditEntry) -> ComplianceResult<()> {
        self.state.write().await.audit.push(entry.clone());
        Ok(())
    }

    async fn list(
        &self,
        action: Option<AuditAction>,
        limit: usize,
    ) -> ComplianceResult<Vec<AuditEntry>> {
        let state = self.state.read().await;
        Ok(state
            .audit
            .iter()
            .rev()
            .filter(|e| action.is_none_or(|a| e.action == a))
            .take(limit)
            .cloned()
            .collect())
    }
}

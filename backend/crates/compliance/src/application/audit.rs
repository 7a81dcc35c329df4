//! Audit Trail
//!
//! Entries are written after the audited change has been persisted. A
//! failed write is logged and does not undo the change.

use std::sync::Arc;

use kernel::error::app_error::AppError;

use crate::domain::entity::audit_entry::{AuditAction, AuditEntry};
use crate::domain::repository::AuditRepository;
use crate::error::ComplianceResult;

pub async fn record_audit<A: AuditRepository>(audit: &A, entry: AuditEntry) {
    let action = entry.action.code();
    match audit.record(&entry).await {
        Ok(()) => tracing::debug!(action, target_id = ?entry.target_id, "Audit entry recorded"),
        Err(e) => tracing::warn!(action, error = %e, "Failed to record audit entry"),
    }
}

pub struct AuditQueries<A>
where
    A: AuditRepository,
{
    audit: Arc<A>,
    limit: usize,
}

impl<A> AuditQueries<A>
where
    A: AuditRepository,
{
    pub fn new(audit: Arc<A>, limit: usize) -> Self {
        Self { audit, limit }
    }

    /// Newest first, optionally filtered by action code
    pub async fn list(&self, action: Option<&str>) -> ComplianceResult<Vec<AuditEntry>> {
        let action = match action.map(str::trim).filter(|a| !a.is_empty()) {
            Some(code) => Some(
                AuditAction::from_code(code)
                    .ok_or_else(|| AppError::bad_request(format!("Unknown audit action: {code}")))?,
            ),
            None => None,
        };
        self.audit.list(action, self.limit).await
    }
}

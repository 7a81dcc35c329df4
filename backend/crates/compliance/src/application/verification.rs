//! Verification Use Cases
//!
//! A billable verification reserves one credit before the provider is
//! called and refunds it if the provider fails, so the balance never goes
//! negative and failed calls are free.

use std::sync::Arc;

use auth::domain::repository::UserRepository;
use kernel::id::{UserId, VerificationId};
use serde_json::{Value, json};

use crate::application::audit::record_audit;
use crate::domain::entity::{
    audit_entry::{AuditAction, AuditEntry, AuditTarget},
    report::Report,
    verification::Verification,
};
use crate::domain::provider::VerificationProvider;
use crate::domain::repository::{AuditRepository, ReportRepository, VerificationRepository};
use crate::domain::value_object::{VerificationKind, VerificationPayload, sanitize::sanitize_input};
use crate::error::{ComplianceError, ComplianceResult};

#[derive(Debug, Clone)]
pub struct VerifyInput {
    pub kind: String,
    pub payload: Value,
    pub vendor_name: Option<String>,
}

pub struct VerifyUseCase<V, Rp, A, U, P>
where
    V: VerificationRepository,
    Rp: ReportRepository,
    A: AuditRepository,
    U: UserRepository,
    P: VerificationProvider,
{
    verifications: Arc<V>,
    reports: Arc<Rp>,
    audit: Arc<A>,
    users: Arc<U>,
    provider: Arc<P>,
}

impl<V, Rp, A, U, P> Clone for VerifyUseCase<V, Rp, A, U, P>
where
    V: VerificationRepository,
    Rp: ReportRepository,
    A: AuditRepository,
    U: UserRepository,
    P: VerificationProvider,
{
    fn clone(&self) -> Self {
        Self {
            verifications: self.verifications.clone(),
            reports: self.reports.clone(),
            audit: self.audit.clone(),
            users: self.users.clone(),
            provider: self.provider.clone(),
        }
    }
}

impl<V, Rp, A, U, P> VerifyUseCase<V, Rp, A, U, P>
where
    V: VerificationRepository,
    Rp: ReportRepository,
    A: AuditRepository,
    U: UserRepository,
    P: VerificationProvider,
{
    pub fn new(
        verifications: Arc<V>,
        reports: Arc<Rp>,
        audit: Arc<A>,
        users: Arc<U>,
        provider: Arc<P>,
    ) -> Self {
        Self {
            verifications,
            reports,
            audit,
            users,
            provider,
        }
    }

    pub async fn execute(&self, owner: UserId, input: VerifyInput) -> ComplianceResult<Verification> {
        let kind = VerificationKind::parse(&input.kind)?;
        let payload = VerificationPayload::parse(kind, &input.payload)?;
        let vendor_name = input
            .vendor_name
            .as_deref()
            .map(sanitize_input)
            .filter(|name| !name.is_empty());

        if kind.is_billable() {
            self.reserve_credit(&owner).await?;
        }

        let mut verification = Verification::new(owner, &payload, vendor_name);
        if let Err(e) = self.verifications.create(&verification).await {
            self.release_credit(kind, &owner).await;
            return Err(e);
        }

        let outcome = self
            .provider
            .verify(kind, &payload.to_provider_json())
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    verification_id = %verification.id,
                    kind = kind.code(),
                    provider = self.provider.name(),
                    error = %e,
                    "Verification failed"
                );
                self.release_credit(kind, &owner).await;
                verification.fail(e.to_string());
                self.verifications.update(&verification).await?;
                return Err(e.into());
            }
        };

        verification.complete(result);
        if let Err(e) = self.store_result(&mut verification, kind).await {
            tracing::error!(
                verification_id = %verification.id,
                error = %e,
                "Failed to store verification result"
            );
            self.release_credit(kind, &owner).await;
            verification.report_id = None;
            verification.fail("Failed to store verification result");
            if let Err(e) = self.verifications.update(&verification).await {
                tracing::error!(verification_id = %verification.id, error = %e, "Failed to mark verification failed");
            }
            return Err(e);
        }

        record_audit(
            self.audit.as_ref(),
            AuditEntry::new(
                owner,
                AuditAction::VerifyVendor,
                AuditTarget::Vendor,
                Some(verification.id.to_string()),
                json!({
                    "type": kind.code(),
                    "vendorName": verification.vendor_name,
                    "reportId": verification.report_id.map(|id| id.to_string()),
                }),
            ),
        )
        .await;

        tracing::info!(
            verification_id = %verification.id,
            kind = kind.code(),
            report_id = ?verification.report_id,
            "Verification completed"
        );
        Ok(verification)
    }

    async fn store_result(&self, verification: &mut Verification, kind: VerificationKind) -> ComplianceResult<()> {
        if kind.produces_report() {
            let report = Report::generate(verification);
            self.reports.create(&report).await?;
            verification.attach_report(report.id);
        }
        self.verifications.update(verification).await
    }

    async fn reserve_credit(&self, owner: &UserId) -> ComplianceResult<()> {
        match self.users.adjust_credits(owner, -1).await? {
            Some(balance) => {
                tracing::debug!(user_id = %owner, balance, "Credit reserved");
                Ok(())
            }
            None => Err(ComplianceError::InsufficientCredits),
        }
    }

    async fn release_credit(&self, kind: VerificationKind, owner: &UserId) {
        if !kind.is_billable() {
            return;
        }
        match self.users.adjust_credits(owner, 1).await {
            Ok(balance) => tracing::debug!(user_id = %owner, ?balance, "Credit refunded"),
            Err(e) => tracing::error!(user_id = %owner, error = %e, "Failed to refund credit"),
        }
    }
}

pub struct VerificationQueries<V>
where
    V: VerificationRepository,
{
    verifications: Arc<V>,
}

impl<V> VerificationQueries<V>
where
    V: VerificationRepository,
{
    pub fn new(verifications: Arc<V>) -> Self {
        Self { verifications }
    }

    /// The caller's records, newest first; `kind` filters by type code
    pub async fn list(&self, owner: &UserId, kind: Option<&str>) -> ComplianceResult<Vec<Verification>> {
        let kind = match kind.map(str::trim).filter(|k| !k.is_empty()) {
            Some(code) => Some(VerificationKind::parse(code)?),
            None => None,
        };
        self.verifications.list_by_owner(owner, kind).await
    }

    /// Another owner's record is reported as absent
    pub async fn get(&self, owner: &UserId, id: &VerificationId) -> ComplianceResult<Verification> {
        self.verifications
            .find_by_id(id)
            .await?
            .filter(|v| v.is_owned_by(owner))
            .ok_or(ComplianceError::VerificationNotFound)
    }
}

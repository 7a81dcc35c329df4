//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{
    AuditEntryId, BulkJobId, CreditChangeId, ReportId, UserId, VerificationId,
};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entity::{
    audit_entry::{AuditAction, AuditEntry},
    bulk_job::{BulkJob, JobStatus, RowError},
    credit_change::CreditChange,
    payment_order::{OrderStatus, PaymentOrder},
    report::Report,
    verification::{Verification, VerificationStatus},
};
use crate::domain::repository::{
    AuditRepository, BulkJobRepository, CreditChangeRepository, PaymentOrderRepository,
    ReportRepository, VerificationRepository,
};
use crate::domain::value_object::{RiskLevel, VerificationKind};
use crate::error::{ComplianceError, ComplianceResult};

const VERIFICATION_COLUMNS: &str = r#"
    id,
    owner_id,
    kind,
    vendor_name,
    payload,
    result,
    status,
    report_id,
    created_at,
    updated_at
"#;

const REPORT_COLUMNS: &str = r#"
    id,
    verification_id,
    owner_id,
    vendor_name,
    kind,
    risk_score,
    risk_level,
    summary,
    created_at,
    expires_at
"#;

const JOB_COLUMNS: &str = r#"
    id,
    owner_id,
    name,
    status,
    total_rows,
    success_count,
    error_count,
    errors,
    report_ids,
    created_at,
    updated_at
"#;

const ORDER_COLUMNS: &str = r#"
    id,
    owner_id,
    plan_code,
    amount_paise,
    currency,
    status,
    payment_id,
    created_at,
    paid_at
"#;

#[derive(Clone)]
pub struct PgComplianceRepository {
    pool: PgPool,
}

impl PgComplianceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn corrupt(column: &str, value: impl std::fmt::Display) -> ComplianceError {
    ComplianceError::Internal(format!("Invalid {column}: {value}"))
}

// ============================================================================
// Verification Repository Implementation
// ============================================================================

impl VerificationRepository for PgComplianceRepository {
    async fn create(&self, verification: &Verification) -> ComplianceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verifications (
                id,
                owner_id,
                kind,
                vendor_name,
                payload,
                result,
                status,
                report_id,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(verification.id.as_uuid())
        .bind(verification.owner.as_uuid())
        .bind(verification.kind.code())
        .bind(&verification.vendor_name)
        .bind(&verification.payload)
        .bind(&verification.result)
        .bind(verification.status.code())
        .bind(verification.report_id.map(|id| id.into_uuid()))
        .bind(verification.created_at)
        .bind(verification.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &VerificationId) -> ComplianceResult<Option<Verification>> {
        let sql = format!("SELECT {VERIFICATION_COLUMNS} FROM verifications WHERE id = $1");
        let row = sqlx::query_as::<_, VerificationRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(VerificationRow::into_verification).transpose()
    }

    async fn update(&self, verification: &Verification) -> ComplianceResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE verifications
            SET result = $2,
                status = $3,
                report_id = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(verification.id.as_uuid())
        .bind(&verification.result)
        .bind(verification.status.code())
        .bind(verification.report_id.map(|id| id.into_uuid()))
        .bind(verification.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ComplianceError::VerificationNotFound);
        }
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        kind: Option<VerificationKind>,
    ) -> ComplianceResult<Vec<Verification>> {
        let sql = format!(
            r#"
            SELECT {VERIFICATION_COLUMNS} FROM verifications
            WHERE owner_id = $1 AND ($2::text IS NULL OR kind = $2)
            ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, VerificationRow>(&sql)
            .bind(owner.as_uuid())
            .bind(kind.map(|k| k.code()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(VerificationRow::into_verification)
            .collect()
    }

    async fn count_by_owner_since(
        &self,
        owner: &UserId,
        since: DateTime<Utc>,
    ) -> ComplianceResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM verifications WHERE owner_id = $1 AND created_at >= $2",
        )
        .bind(owner.as_uuid())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}

// ============================================================================
// Report Repository Implementation
// ============================================================================

impl ReportRepository for PgComplianceRepository {
    async fn create(&self, report: &Report) -> ComplianceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (
                id,
                verification_id,
                owner_id,
                vendor_name,
                kind,
                risk_score,
                risk_level,
                summary,
                created_at,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(report.id.as_uuid())
        .bind(report.verification_id.as_uuid())
        .bind(report.owner.as_uuid())
        .bind(&report.vendor_name)
        .bind(report.kind.code())
        .bind(i16::from(report.risk_score))
        .bind(report.risk_level.code())
        .bind(&report.summary)
        .bind(report.created_at)
        .bind(report.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ReportId) -> ComplianceResult<Option<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ReportRow::into_report).transpose()
    }

    async fn list_by_owner(&self, owner: &UserId) -> ComplianceResult<Vec<Report>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ReportRow::into_report).collect()
    }
}

// ============================================================================
// Bulk Job Repository Implementation
// ============================================================================

impl BulkJobRepository for PgComplianceRepository {
    async fn create(&self, job: &BulkJob) -> ComplianceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bulk_jobs (
                id,
                owner_id,
                name,
                status,
                total_rows,
                success_count,
                error_count,
                errors,
                report_ids,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.owner.as_uuid())
        .bind(&job.name)
        .bind(job.status.code())
        .bind(job.total_rows as i32)
        .bind(job.success_count as i32)
        .bind(job.error_count as i32)
        .bind(Json(&job.errors))
        .bind(report_uuids(job))
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &BulkJobId) -> ComplianceResult<Option<BulkJob>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM bulk_jobs WHERE id = $1");
        let row = sqlx::query_as::<_, BulkJobRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(BulkJobRow::into_job).transpose()
    }

    async fn update(&self, job: &BulkJob) -> ComplianceResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bulk_jobs
            SET status = $2,
                success_count = $3,
                error_count = $4,
                errors = $5,
                report_ids = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.status.code())
        .bind(job.success_count as i32)
        .bind(job.error_count as i32)
        .bind(Json(&job.errors))
        .bind(report_uuids(job))
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ComplianceError::JobNotFound);
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner: &UserId) -> ComplianceResult<Vec<BulkJob>> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM bulk_jobs WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, BulkJobRow>(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(BulkJobRow::into_job).collect()
    }
}

fn report_uuids(job: &BulkJob) -> Vec<Uuid> {
    job.report_ids.iter().map(|id| id.into_uuid()).collect()
}

// ============================================================================
// Payment Order Repository Implementation
// ============================================================================

impl PaymentOrderRepository for PgComplianceRepository {
    async fn create(&self, order: &PaymentOrder) -> ComplianceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_orders (
                id,
                owner_id,
                plan_code,
                amount_paise,
                currency,
                status,
                payment_id,
                created_at,
                paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&order.id)
        .bind(order.owner.as_uuid())
        .bind(&order.plan_code)
        .bind(order.amount_paise)
        .bind(&order.currency)
        .bind(order.status.code())
        .bind(&order.payment_id)
        .bind(order.created_at)
        .bind(order.paid_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, order_id: &str) -> ComplianceResult<Option<PaymentOrder>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM payment_orders WHERE id = $1");
        let row = sqlx::query_as::<_, PaymentOrderRow>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PaymentOrderRow::into_order).transpose()
    }

    async fn mark_paid(&self, order: &PaymentOrder) -> ComplianceResult<bool> {
        // Conditional on the current status, so only one caller wins
        let result = sqlx::query(
            r#"
            UPDATE payment_orders
            SET status = $2,
                payment_id = $3,
                paid_at = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(&order.id)
        .bind(OrderStatus::Paid.code())
        .bind(&order.payment_id)
        .bind(order.paid_at)
        .bind(OrderStatus::Created.code())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn reopen(&self, order_id: &str) -> ComplianceResult<()> {
        sqlx::query(
            r#"
            UPDATE payment_orders
            SET status = $2, payment_id = NULL, paid_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .bind(OrderStatus::Created.code())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ============================================================================
// Credit Change Repository Implementation
// ============================================================================

impl CreditChangeRepository for PgComplianceRepository {
    async fn create(&self, change: &CreditChange) -> ComplianceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO credit_changes (
                id,
                admin_id,
                admin_email,
                user_id,
                user_email,
                change,
                reason,
                balance_after,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(change.id.as_uuid())
        .bind(change.admin.as_uuid())
        .bind(&change.admin_email)
        .bind(change.user_id.as_uuid())
        .bind(&change.user_email)
        .bind(change.change)
        .bind(&change.reason)
        .bind(change.balance_after)
        .bind(change.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> ComplianceResult<Vec<CreditChange>> {
        let rows = sqlx::query_as::<_, CreditChangeRow>(
            r#"
            SELECT id, admin_id, admin_email, user_id, user_email, change, reason,
                   balance_after, created_at
            FROM credit_changes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CreditChangeRow::into_change).collect())
    }
}

// ============================================================================
// Audit Repository Implementation
// ============================================================================

impl AuditRepository for PgComplianceRepository {
    async fn record(&self, entry: &AuditEntry) -> ComplianceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id,
                actor_id,
                action,
                target_type,
                target_id,
                details,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.actor.as_uuid())
        .bind(entry.action.code())
        .bind(&entry.target_type)
        .bind(&entry.target_id)
        .bind(&entry.details)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(
        &self,
        action: Option<AuditAction>,
        limit: usize,
    ) -> ComplianceResult<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, actor_id, action, target_type, target_id, details, created_at
            FROM audit_logs
            WHERE ($1::text IS NULL OR action = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(action.map(|a| a.code()))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditRow::into_entry).collect()
    }
}

// ============================================================================
// Row Types
// ============================================================================

fn parse_kind(code: &str) -> ComplianceResult<VerificationKind> {
    VerificationKind::from_code(code).ok_or_else(|| corrupt("kind", code))
}

#[derive(sqlx::FromRow)]
struct VerificationRow {
    id: Uuid,
    owner_id: Uuid,
    kind: String,
    vendor_name: Option<String>,
    payload: Value,
    result: Value,
    status: String,
    report_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VerificationRow {
    fn into_verification(self) -> ComplianceResult<Verification> {
        Ok(Verification {
            id: VerificationId::from_uuid(self.id),
            owner: UserId::from_uuid(self.owner_id),
            kind: parse_kind(&self.kind)?,
            vendor_name: self.vendor_name,
            payload: self.payload,
            result: self.result,
            status: VerificationStatus::from_code(&self.status)
                .ok_or_else(|| corrupt("verification status", &self.status))?,
            report_id: self.report_id.map(ReportId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    verification_id: Uuid,
    owner_id: Uuid,
    vendor_name: Option<String>,
    kind: String,
    risk_score: i16,
    risk_level: String,
    summary: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl ReportRow {
    fn into_report(self) -> ComplianceResult<Report> {
        Ok(Report {
            id: ReportId::from_uuid(self.id),
            verification_id: VerificationId::from_uuid(self.verification_id),
            owner: UserId::from_uuid(self.owner_id),
            vendor_name: self.vendor_name,
            kind: parse_kind(&self.kind)?,
            risk_score: u8::try_from(self.risk_score)
                .map_err(|_| corrupt("risk_score", self.risk_score))?,
            risk_level: RiskLevel::from_code(&self.risk_level)
                .ok_or_else(|| corrupt("risk_level", &self.risk_level))?,
            summary: self.summary,
            created_at: self.created_at,
            expires_at: self.expires_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BulkJobRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    status: String,
    total_rows: i32,
    success_count: i32,
    error_count: i32,
    errors: Json<Vec<RowError>>,
    report_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BulkJobRow {
    fn into_job(self) -> ComplianceResult<BulkJob> {
        Ok(BulkJob {
            id: BulkJobId::from_uuid(self.id),
            owner: UserId::from_uuid(self.owner_id),
            name: self.name,
            status: JobStatus::from_code(&self.status)
                .ok_or_else(|| corrupt("job status", &self.status))?,
            total_rows: self.total_rows.max(0) as usize,
            success_count: self.success_count.max(0) as usize,
            error_count: self.error_count.max(0) as usize,
            errors: self.errors.0,
            report_ids: self.report_ids.into_iter().map(ReportId::from_uuid).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PaymentOrderRow {
    id: String,
    owner_id: Uuid,
    plan_code: String,
    amount_paise: i64,
    currency: String,
    status: String,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl PaymentOrderRow {
    fn into_order(self) -> ComplianceResult<PaymentOrder> {
        Ok(PaymentOrder {
            id: self.id,
            owner: UserId::from_uuid(self.owner_id),
            plan_code: self.plan_code,
            amount_paise: self.amount_paise,
            currency: self.currency,
            status: OrderStatus::from_code(&self.status)
                .ok_or_else(|| corrupt("order status", &self.status))?,
            payment_id: self.payment_id,
            created_at: self.created_at,
            paid_at: self.paid_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CreditChangeRow {
    id: Uuid,
    admin_id: Uuid,
    admin_email: String,
    user_id: Uuid,
    user_email: String,
    change: i64,
    reason: String,
    balance_after: i64,
    created_at: DateTime<Utc>,
}

impl CreditChangeRow {
    fn into_change(self) -> CreditChange {
        CreditChange {
            id: CreditChangeId::from_uuid(self.id),
            admin: UserId::from_uuid(self.admin_id),
            admin_email: self.admin_email,
            user_id: UserId::from_uuid(self.user_id),
            user_email: self.user_email,
            change: self.change,
            reason: self.reason,
            balance_after: self.balance_after,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    actor_id: Uuid,
    action: String,
    target_type: String,
    target_id: Option<String>,
    details: Value,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_entry(self) -> ComplianceResult<AuditEntry> {
        Ok(AuditEntry {
            id: AuditEntryId::from_uuid(self.id),
            actor: UserId::from_uuid(self.actor_id),
            action: AuditAction::from_code(&self.action)
                .ok_or_else(|| corrupt("audit action", &self.action))?,
            target_type: self.target_type,
            target_id: self.target_id,
            details: self.details,
            created_at: self.created_at,
        })
    }
}

//! API DTOs (Data Transfer Objects)
//!
//! Timestamps are RFC 3339 strings in UTC.

use auth::domain::entity::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::{CreditBalance, DashboardStats, PaymentOutcome};
use crate::domain::entity::{
    audit_entry::AuditEntry,
    bulk_job::{BulkJob, RowError},
    credit_change::CreditChange,
    payment_order::PaymentOrder,
    plan::Plan,
    report::{Report, ReportStatus},
    verification::Verification,
};

// ============================================================================
// Verifications
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    pub vendor_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationListQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub vendor_name: Option<String>,
    pub payload: Value,
    pub result: Value,
    pub status: &'static str,
    pub report_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Verification> for VerificationResponse {
    fn from(v: &Verification) -> Self {
        Self {
            id: v.id.to_string(),
            kind: v.kind.code(),
            vendor_name: v.vendor_name.clone(),
            payload: v.payload.clone(),
            result: v.result.clone(),
            status: v.status.code(),
            report_id: v.report_id.map(|id| id.to_string()),
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationListResponse {
    pub verifications: Vec<VerificationResponse>,
}

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub verification_id: String,
    pub vendor_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub risk_score: u8,
    pub risk_level: &'static str,
    pub summary: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Report> for ReportResponse {
    fn from(r: &Report) -> Self {
        Self {
            id: r.id.to_string(),
            verification_id: r.verification_id.to_string(),
            vendor_name: r.vendor_name.clone(),
            kind: r.kind.code(),
            risk_score: r.risk_score,
            risk_level: r.risk_level.code(),
            summary: r.summary.clone(),
            status: r.status(),
            created_at: r.created_at,
            expires_at: r.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<ReportResponse>,
}

// ============================================================================
// Credits & Dashboard
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalanceResponse {
    pub balance: i64,
    pub monthly_limit: i64,
    pub plan_id: Option<String>,
}

impl From<CreditBalance> for CreditBalanceResponse {
    fn from(b: CreditBalance) -> Self {
        Self {
            balance: b.balance,
            monthly_limit: b.monthly_limit,
            plan_id: b.plan_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsResponse {
    pub credits_remaining: i64,
    pub credits_total: i64,
    pub verifications_this_month: u64,
    pub total_reports: usize,
    pub high_risk_vendors: usize,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(s: DashboardStats) -> Self {
        Self {
            credits_remaining: s.credits_remaining,
            credits_total: s.credits_total,
            verifications_this_month: s.verifications_this_month,
            total_reports: s.total_reports,
            high_risk_vendors: s.high_risk_vendors,
        }
    }
}

// ============================================================================
// Plans & Payments
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PlanListResponse {
    pub plans: &'static [Plan],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub plan_code: String,
}

/// Everything the checkout widget needs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key: String,
    pub name: String,
    pub description: String,
    pub plan_code: String,
}

impl CreateOrderResponse {
    pub fn new(order: &PaymentOrder, plan: &Plan, key: &str, merchant: &str) -> Self {
        Self {
            order_id: order.id.clone(),
            amount: order.amount_paise,
            currency: order.currency.clone(),
            key: key.to_string(),
            name: merchant.to_string(),
            description: format!("{} plan subscription", plan.name),
            plan_code: plan.code.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub credits: i64,
}

impl From<PaymentOutcome> for VerifyPaymentResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message(),
            credits: outcome.credits,
        }
    }
}

// ============================================================================
// Bulk Upload
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadQuery {
    pub job_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadResponse {
    pub success: bool,
    pub job_id: String,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkJobResponse {
    pub id: String,
    pub name: String,
    pub status: &'static str,
    pub total_rows: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
    pub report_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&BulkJob> for BulkJobResponse {
    fn from(job: &BulkJob) -> Self {
        Self {
            id: job.id.to_string(),
            name: job.name.clone(),
            status: job.status.code(),
            total_rows: job.total_rows,
            success_count: job.success_count,
            error_count: job.error_count,
            errors: job.errors.clone(),
            report_ids: job.report_ids.iter().map(|id| id.to_string()).collect(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkJobListResponse {
    pub jobs: Vec<BulkJobResponse>,
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: &'static str,
    pub plan: Option<String>,
    pub credits: i64,
    pub monthly_limit: i64,
    pub status: &'static str,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for AdminUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.public_id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.clone(),
            role: user.user_role.code(),
            plan: user.plan_id.clone(),
            credits: user.credits,
            monthly_limit: user.monthly_credit_limit,
            status: user.user_status.code(),
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminUserListResponse {
    pub users: Vec<AdminUserResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustCreditsRequest {
    pub change: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    pub plan_code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditChangeResponse {
    pub id: String,
    pub admin: String,
    pub user_email: String,
    pub change: i64,
    pub reason: String,
    pub balance_after: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&CreditChange> for CreditChangeResponse {
    fn from(c: &CreditChange) -> Self {
        Self {
            id: c.id.to_string(),
            admin: c.admin_email.clone(),
            user_email: c.user_email.clone(),
            change: c.change,
            reason: c.reason.clone(),
            balance_after: c.balance_after,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditChangeListResponse {
    pub credit_changes: Vec<CreditChangeResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogQuery {
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: String,
    pub actor: String,
    pub action: &'static str,
    pub target_type: String,
    pub target_id: Option<String>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl From<&AuditEntry> for AuditEntryResponse {
    fn from(e: &AuditEntry) -> Self {
        Self {
            id: e.id.to_string(),
            actor: e.actor.to_string(),
            action: e.action.code(),
            target_type: e.target_type.clone(),
            target_id: e.target_id.clone(),
            details: e.details.clone(),
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogResponse {
    pub logs: Vec<AuditEntryResponse>,
}

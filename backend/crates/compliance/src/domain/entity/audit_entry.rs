//! Audit Entry

use chrono::{DateTime, Utc};
use kernel::id::{AuditEntryId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    VerifyVendor,
    PlanUpgrade,
    BulkUploadCreated,
    UserSuspended,
    UserActivated,
    CreditsChanged,
    PlanChanged,
}

impl AuditAction {
    pub const fn code(&self) -> &'static str {
        match self {
            AuditAction::VerifyVendor => "VERIFY_VENDOR",
            AuditAction::PlanUpgrade => "PLAN_UPGRADE",
            AuditAction::BulkUploadCreated => "BULK_UPLOAD_CREATED",
            AuditAction::UserSuspended => "USER_SUSPENDED",
            AuditAction::UserActivated => "USER_ACTIVATED",
            AuditAction::CreditsChanged => "CREDITS_CHANGED",
            AuditAction::PlanChanged => "PLAN_CHANGED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "VERIFY_VENDOR" => Some(AuditAction::VerifyVendor),
            "PLAN_UPGRADE" => Some(AuditAction::PlanUpgrade),
            "BULK_UPLOAD_CREATED" => Some(AuditAction::BulkUploadCreated),
            "USER_SUSPENDED" => Some(AuditAction::UserSuspended),
            "USER_ACTIVATED" => Some(AuditAction::UserActivated),
            "CREDITS_CHANGED" => Some(AuditAction::CreditsChanged),
            "PLAN_CHANGED" => Some(AuditAction::PlanChanged),
            _ => None,
        }
    }
}

/// What an audit entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditTarget {
    Vendor,
    Subscription,
    Job,
    User,
}

impl AuditTarget {
    pub const fn code(&self) -> &'static str {
        match self {
            AuditTarget::Vendor => "VENDOR",
            AuditTarget::Subscription => "SUBSCRIPTION",
            AuditTarget::Job => "JOB",
            AuditTarget::User => "USER",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub actor: UserId,
    pub action: AuditAction,
    pub target_type: String,
    pub target_id: Option<String>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor: UserId,
        action: AuditAction,
        target: AuditTarget,
        target_id: Option<String>,
        details: Value,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            actor,
            action,
            target_type: target.code().to_string(),
            target_id,
            details,
            created_at: Utc::now(),
        }
    }
}

//! Verification Record
//!
//! One call to the verification provider on behalf of a user. Records
//! start as `processing` and end either `completed` with the provider
//! result or `failed` with `{error}`.

use chrono::{DateTime, Utc};
use kernel::id::{ReportId, UserId, VerificationId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::value_object::{VerificationKind, VerificationPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Processing,
    Completed,
    Failed,
}

impl VerificationStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            VerificationStatus::Processing => "processing",
            VerificationStatus::Completed => "completed",
            VerificationStatus::Failed => "failed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "processing" => Some(VerificationStatus::Processing),
            "completed" => Some(VerificationStatus::Completed),
            "failed" => Some(VerificationStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Verification {
    pub id: VerificationId,
    pub owner: UserId,
    pub kind: VerificationKind,
    pub vendor_name: Option<String>,
    /// Request fields as stored (Aadhaar masked)
    pub payload: Value,
    /// Provider result, `{error}` on failure, `null` while processing
    pub result: Value,
    pub status: VerificationStatus,
    pub report_id: Option<ReportId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Verification {
    pub fn new(owner: UserId, payload: &VerificationPayload, vendor_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: VerificationId::new(),
            owner,
            kind: payload.kind(),
            vendor_name,
            payload: payload.to_record_json(),
            result: Value::Null,
            status: VerificationStatus::Processing,
            report_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn complete(&mut self, result: Value) {
        self.result = result;
        self.status = VerificationStatus::Completed;
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.result = json!({ "error": message.into() });
        self.status = VerificationStatus::Failed;
        self.updated_at = Utc::now();
    }

    pub fn attach_report(&mut self, report_id: ReportId) {
        self.report_id = Some(report_id);
        self.updated_at = Utc::now();
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }

    /// Name shown in reports and bulk job errors
    pub fn display_vendor(&self) -> String {
        self.vendor_name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

//! Compliance Report
//!
//! Generated from a completed verification. Validity runs to midnight UTC
//! seven days after the creation day; status is derived at read time.

use chrono::{DateTime, Days, Utc};
use kernel::id::{ReportId, UserId, VerificationId};
use serde::Serialize;

use crate::domain::entity::verification::Verification;
use crate::domain::value_object::{RiskLevel, RiskSignals, VerificationKind};

pub const VALIDITY_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportStatus {
    Active,
    Expired,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub id: ReportId,
    pub verification_id: VerificationId,
    pub owner: UserId,
    pub vendor_name: Option<String>,
    pub kind: VerificationKind,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Report {
    /// Score the verification's result and build the report
    pub fn generate(verification: &Verification) -> Self {
        let signals = RiskSignals::collect(&verification.result);
        let risk_score = signals.score();
        let risk_level = RiskLevel::from_score(risk_score);
        let created_at = Utc::now();

        Self {
            id: ReportId::new(),
            verification_id: verification.id,
            owner: verification.owner,
            vendor_name: verification.vendor_name.clone(),
            kind: verification.kind,
            risk_score,
            risk_level,
            summary: summarize(verification, &signals, risk_score, risk_level),
            created_at,
            expires_at: expiry_for(created_at),
        }
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> ReportStatus {
        if now < self.expires_at {
            ReportStatus::Active
        } else {
            ReportStatus::Expired
        }
    }

    pub fn status(&self) -> ReportStatus {
        self.status_at(Utc::now())
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }

    /// Vendor key for distinct counting: the name, or the verification id
    pub fn vendor_key(&self) -> String {
        self.vendor_name
            .clone()
            .unwrap_or_else(|| self.verification_id.to_string())
    }
}

/// Midnight UTC of the creation day, plus the validity window
pub fn expiry_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = created_at
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    midnight
        .checked_add_days(Days::new(VALIDITY_DAYS))
        .unwrap_or(midnight)
}

fn summarize(
    verification: &Verification,
    signals: &RiskSignals,
    score: u8,
    level: RiskLevel,
) -> String {
    let subject = match &verification.vendor_name {
        Some(name) => format!("{} verification for {}", verification.kind.label(), name),
        None => format!("{} verification", verification.kind.label()),
    };

    let mut findings = Vec::new();
    if let Some(status) = &signals.adverse_status {
        findings.push(format!("Registration status reported as '{status}'."));
    }
    if let Some(check) = &signals.failed_check {
        findings.push(format!("Check '{check}' returned false."));
    }
    if findings.is_empty() {
        findings.push("No adverse findings.".to_string());
    }

    format!(
        "{subject} completed. Risk level: {} (score {score}). {}",
        level.code().to_uppercase(),
        findings.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::VerificationPayload;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    fn completed(result: Value) -> Verification {
        let payload = VerificationPayload::parse(
            VerificationKind::Gst,
            &json!({"gstin": "27AABCU9603R1ZX"}),
        )
        .unwrap();
        let mut v = Verification::new(UserId::new(), &payload, Some("ACME Corp".into()));
        v.complete(result);
        v
    }

    #[test]
    fn test_expiry_is_midnight_plus_seven_days() {
        let created = Utc.with_ymd_and_hms(2026, 3, 10, 17, 45, 12).unwrap();
        let expires = expiry_for(created);
        assert_eq!(expires, Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_status_flips_at_expiry() {
        let report = Report::generate(&completed(json!({"status": "success"})));
        assert_eq!(report.status(), ReportStatus::Active);
        assert_eq!(report.status_at(report.expires_at), ReportStatus::Expired);
        assert_eq!(
            report.status_at(report.expires_at - chrono::Duration::seconds(1)),
            ReportStatus::Active
        );
    }

    #[test]
    fn test_clean_result_summary() {
        let report = Report::generate(&completed(
            json!({"status": "success", "details": {"legal_name": "ACME Corp", "status": "Active"}}),
        ));
        assert_eq!(report.risk_score, 20);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(
            report.summary,
            "GST verification for ACME Corp completed. Risk level: LOW (score 20). No adverse findings."
        );
        assert_eq!(report.vendor_key(), "ACME Corp");
    }

    #[test]
    fn test_adverse_result_is_high() {
        let report = Report::generate(&completed(
            json!({"details": {"gstStatus": "Cancelled"}, "verified": false}),
        ));
        assert_eq!(report.risk_score, 100);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert!(report.summary.contains("'Cancelled'"));
        assert!(report.summary.contains("'verified'"));
    }
}

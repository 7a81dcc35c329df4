//! Risk Assessment
//!
//! Deterministic score over a provider result. The score starts at a
//! baseline and adds weight for each adverse signal found anywhere in the
//! result document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BASE_SCORE: u8 = 20;
pub const ADVERSE_STATUS_WEIGHT: u8 = 55;
pub const FAILED_CHECK_WEIGHT: u8 = 50;
pub const MAX_SCORE: u8 = 100;

/// Status words that mark a registration as not in good standing
const ADVERSE_STATUSES: &[&str] = &[
    "inactive",
    "cancelled",
    "canceled",
    "suspended",
    "struck off",
    "strike off",
    "invalid",
];

/// Keys whose `false` value means the check itself failed
const FAILED_CHECK_KEYS: &[&str] = &["verified", "accountExists", "account_exists"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..30 => RiskLevel::Low,
            30..70 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Findings that contributed to a score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskSignals {
    pub adverse_status: Option<String>,
    pub failed_check: Option<String>,
}

impl RiskSignals {
    pub fn collect(result: &Value) -> Self {
        let mut signals = Self::default();
        signals.walk(result);
        signals
    }

    fn walk(&mut self, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, v) in map {
                    let lower = key.to_ascii_lowercase();
                    if self.adverse_status.is_none() && lower.contains("status") {
                        if let Some(s) = v.as_str().filter(|s| is_adverse_status(s)) {
                            self.adverse_status = Some(s.to_string());
                        }
                    }
                    if self.failed_check.is_none()
                        && FAILED_CHECK_KEYS.contains(&key.as_str())
                        && v == &Value::Bool(false)
                    {
                        self.failed_check = Some(key.clone());
                    }
                    self.walk(v);
                }
            }
            Value::Array(items) => items.iter().for_each(|v| self.walk(v)),
            _ => {}
        }
    }

    pub fn score(&self) -> u8 {
        let mut score = BASE_SCORE;
        if self.adverse_status.is_some() {
            score = score.saturating_add(ADVERSE_STATUS_WEIGHT);
        }
        if self.failed_check.is_some() {
            score = score.saturating_add(FAILED_CHECK_WEIGHT);
        }
        score.min(MAX_SCORE)
    }
}

fn is_adverse_status(status: &str) -> bool {
    let status = status.trim().to_ascii_lowercase().replace(['-', '_'], " ");
    ADVERSE_STATUSES.iter().any(|s| status == *s || status.starts_with(&format!("{s} ")))
}

pub fn risk_score(result: &Value) -> u8 {
    RiskSignals::collect(result).score()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn test_clean_result_is_low() {
        let result = json!({"status": "success", "details": {"legal_name": "ACME Corp", "status": "Active"}});
        assert_eq!(risk_score(&result), 20);
        assert_eq!(RiskLevel::from_score(risk_score(&result)), RiskLevel::Low);
    }

    #[test]
    fn test_adverse_status_anywhere() {
        let result = json!({"data": [{"gstStatus": "Cancelled"}]});
        let signals = RiskSignals::collect(&result);
        assert_eq!(signals.adverse_status.as_deref(), Some("Cancelled"));
        assert_eq!(signals.score(), 75);

        assert_eq!(risk_score(&json!({"company_status": "Strike-Off"})), 75);
    }

    #[test]
    fn test_failed_check_and_clamp() {
        assert_eq!(risk_score(&json!({"accountExists": false})), 70);
        assert_eq!(
            risk_score(&json!({"verified": false, "status": "INVALID"})),
            100
        );
    }

    #[test]
    fn test_verified_true_adds_nothing() {
        assert_eq!(risk_score(&json!({"verified": true, "status": "Active"})), 20);
    }
}

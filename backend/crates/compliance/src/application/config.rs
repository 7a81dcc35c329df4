//! Application Configuration

use std::time::Duration;

use platform::upstream::DEFAULT_TIMEOUT;

/// Credentials for the live Plan API
#[derive(Debug, Clone)]
pub struct PlanApiSettings {
    pub base_url: String,
    pub token_id: String,
    pub api_user_id: String,
    pub api_password: String,
    pub timeout: Duration,
}

impl PlanApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_id: String::new(),
            api_user_id: String::new(),
            api_password: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Compliance application configuration
#[derive(Debug, Clone)]
pub struct ComplianceConfig {
    /// `None` selects the sandbox provider
    pub plan_api: Option<PlanApiSettings>,
    /// Upstream for the `/api/gateway` passthrough routes
    pub gateway_upstream_url: String,
    pub gateway_timeout: Duration,
    /// Public key id handed to the checkout widget
    pub razorpay_key_id: String,
    /// HMAC key for payment signatures
    pub razorpay_key_secret: String,
    /// Merchant name shown at checkout
    pub merchant_name: String,
    pub audit_log_limit: usize,
    /// Largest accepted bulk upload, in data rows
    pub bulk_max_rows: usize,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            plan_api: None,
            gateway_upstream_url: "http://localhost:8001".to_string(),
            gateway_timeout: DEFAULT_TIMEOUT,
            razorpay_key_id: String::new(),
            razorpay_key_secret: String::new(),
            merchant_name: "Ravono".to_string(),
            audit_log_limit: 200,
            bulk_max_rows: 1000,
        }
    }
}

impl ComplianceConfig {
    /// Sandbox provider and test payment keys
    pub fn development() -> Self {
        Self {
            razorpay_key_id: "rzp_test_ravono".to_string(),
            razorpay_key_secret: "rzp_test_secret".to_string(),
            ..Default::default()
        }
    }

    pub fn uses_sandbox(&self) -> bool {
        self.plan_api.is_none()
    }
}

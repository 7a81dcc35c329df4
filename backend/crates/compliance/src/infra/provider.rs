//! Provider Selection
//!
//! The provider is picked once at startup from configuration.

use serde_json::Value;

use crate::application::config::ComplianceConfig;
use crate::domain::provider::{ProviderError, VerificationProvider};
use crate::domain::value_object::VerificationKind;
use crate::error::{ComplianceError, ComplianceResult};
use crate::infra::plan_api::PlanApiProvider;
use crate::infra::sandbox::SandboxProvider;

#[derive(Debug, Clone)]
pub enum Provider {
    PlanApi(PlanApiProvider),
    Sandbox(SandboxProvider),
}

impl Provider {
    /// Plan API when configured, sandbox otherwise
    pub fn from_config(config: &ComplianceConfig) -> ComplianceResult<Self> {
        match &config.plan_api {
            Some(settings) => {
                let provider = PlanApiProvider::new(settings)
                    .map_err(|e| ComplianceError::Internal(e.to_string()))?;
                tracing::info!(base_url = %settings.base_url, "Using Plan API verification provider");
                Ok(Provider::PlanApi(provider))
            }
            None => {
                tracing::info!("Using sandbox verification provider");
                Ok(Provider::Sandbox(SandboxProvider::new()))
            }
        }
    }
}

impl VerificationProvider for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::PlanApi(p) => p.name(),
            Provider::Sandbox(p) => p.name(),
        }
    }

    async fn verify(&self, kind: VerificationKind, payload: &Value) -> Result<Value, ProviderError> {
        match self {
            Provider::PlanApi(p) => p.verify(kind, payload).await,
            Provider::Sandbox(p) => p.verify(kind, payload).await,
        }
    }
}

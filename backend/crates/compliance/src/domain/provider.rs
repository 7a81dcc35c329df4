//! Verification Provider
//!
//! The eKYC backend a verification is delegated to. Implementations live
//! in `infra`.

use serde_json::Value;
use thiserror::Error;

use crate::domain::value_object::VerificationKind;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("provider request timed out")]
    Timeout,

    #[error("provider unreachable: {0}")]
    Transport(String),

    #[error("provider returned an unreadable body")]
    Decode,

    /// The provider understood the request and refused it
    #[error("{0}")]
    Rejected(String),
}

#[trait_variant::make(VerificationProvider: Send)]
pub trait LocalVerificationProvider {
    /// Short name recorded on logs
    fn name(&self) -> &'static str;

    /// Run one verification; `payload` is the normalized provider JSON
    async fn verify(&self, kind: VerificationKind, payload: &Value) -> Result<Value, ProviderError>;
}

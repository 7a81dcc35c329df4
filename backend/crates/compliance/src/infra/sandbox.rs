//! Sandbox Provider
//!
//! Deterministic canned answers for development and tests. A few inputs
//! are wired to adverse outcomes so risk scoring can be exercised:
//! - GSTINs with state code `99` come back `Cancelled`
//! - PANs ending in `X` come back `Invalid`
//! - bank accounts ending in `0000` do not exist
//! - CINs whose company number ends in `000000` are `Strike Off`

use std::collections::HashSet;
use std::sync::Arc;

use nid::Nanoid;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::domain::provider::{ProviderError, VerificationProvider};
use crate::domain::value_object::VerificationKind;

#[derive(Debug, Clone, Default)]
pub struct SandboxProvider {
    issued_req_ids: Arc<RwLock<HashSet<String>>>,
}

impl SandboxProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn text<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn last_four(s: &str) -> &str {
    s.get(s.len().saturating_sub(4)..).unwrap_or(s)
}

impl VerificationProvider for SandboxProvider {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    async fn verify(&self, kind: VerificationKind, payload: &Value) -> Result<Value, ProviderError> {
        let result = match kind {
            VerificationKind::Gst => {
                let gstin = text(payload, "gstin");
                let status = if gstin.starts_with("99") { "Cancelled" } else { "Active" };
                json!({
                    "status": "success",
                    "details": {
                        "gstin": gstin,
                        "legal_name": format!("Sandbox Traders {}", last_four(gstin)),
                        "state_code": gstin.get(..2).unwrap_or_default(),
                        "status": status,
                    }
                })
            }
            VerificationKind::Pan => {
                let pan = text(payload, "pan");
                let valid = !pan.ends_with('X');
                json!({
                    "status": "success",
                    "details": {
                        "pan": pan,
                        "name": payload.get("holder").cloned().unwrap_or(Value::Null),
                        "pan_status": if valid { "Valid" } else { "Invalid" },
                    }
                })
            }
            VerificationKind::AadhaarSendOtp => {
                let req_id = format!("sbx_{}", Nanoid::<21>::new());
                self.issued_req_ids.write().await.insert(req_id.clone());
                json!({ "status": "success", "message": "OTP sent", "reqId": req_id })
            }
            VerificationKind::AadhaarSubmitOtp => {
                let req_id = text(payload, "reqId");
                if !self.issued_req_ids.write().await.remove(req_id) {
                    return Err(ProviderError::Rejected(format!(
                        "Unknown or expired reqId: {req_id}"
                    )));
                }
                json!({
                    "status": "success",
                    "verified": true,
                    "details": { "aadhaar_last_four": last_four(text(payload, "aadhaar")) }
                })
            }
            VerificationKind::Bank => {
                let account = text(payload, "account");
                let exists = !account.ends_with("0000");
                json!({
                    "status": "success",
                    "accountExists": exists,
                    "details": {
                        "ifsc": text(payload, "ifsc"),
                        "account_last_four": last_four(account),
                        "name_at_bank": payload.get("name").cloned().unwrap_or(Value::Null),
                    }
                })
            }
            VerificationKind::McaCin => {
                let cin = text(payload, "cin");
                let status = if cin.ends_with("000000") { "Strike Off" } else { "Active" };
                json!({
                    "status": "success",
                    "details": {
                        "cin": cin,
                        "company_name": format!("Sandbox Industries {}", last_four(cin)),
                        "company_status": status,
                    }
                })
            }
            VerificationKind::Din => json!({
                "status": "success",
                "details": { "din": text(payload, "din"), "director_status": "Approved" }
            }),
            VerificationKind::Passport => json!({
                "status": "success",
                "verified": true,
                "details": { "file_no": text(payload, "file_no"), "dob": text(payload, "dob") }
            }),
        };
        Ok(result)
    }
}

//! Verification Payload
//!
//! The request fields of one verification, parsed and validated for its
//! kind. Field values may arrive as JSON strings or numbers.

use kernel::error::app_error::{AppError, AppResult};
use serde_json::{Map, Value, json};

use super::identifier::{
    Aadhaar, BankAccount, Cin, DateOfBirth, Din, Gstin, Ifsc, Otp, Pan, PassportFileNo,
};
use super::sanitize::sanitize_input;
use super::verification_kind::VerificationKind;

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationPayload {
    Gst {
        gstin: Gstin,
        state_code: Option<String>,
    },
    Pan {
        pan: Pan,
        holder: Option<String>,
    },
    AadhaarSendOtp {
        aadhaar: Aadhaar,
    },
    AadhaarSubmitOtp {
        aadhaar: Aadhaar,
        otp: Otp,
        req_id: String,
    },
    Bank {
        account: BankAccount,
        ifsc: Ifsc,
        name: Option<String>,
    },
    McaCin {
        cin: Cin,
    },
    Din {
        din: Din,
    },
    Passport {
        file_no: PassportFileNo,
        dob: DateOfBirth,
    },
}

impl VerificationPayload {
    pub fn parse(kind: VerificationKind, raw: &Value) -> AppResult<Self> {
        let fields = raw
            .as_object()
            .ok_or_else(|| AppError::bad_request("Payload must be a JSON object"))?;
        let text = |key: &str| field(fields, key).unwrap_or_default();

        let payload = match kind {
            VerificationKind::Gst => Self::Gst {
                gstin: Gstin::new(&text("gstin"))?,
                state_code: optional(fields, "stateCode"),
            },
            VerificationKind::Pan => Self::Pan {
                pan: Pan::new(&text("pan"))?,
                holder: optional(fields, "holder"),
            },
            VerificationKind::AadhaarSendOtp => Self::AadhaarSendOtp {
                aadhaar: Aadhaar::new(&text("aadhaar"))?,
            },
            VerificationKind::AadhaarSubmitOtp => Self::AadhaarSubmitOtp {
                aadhaar: Aadhaar::new(&text("aadhaar"))?,
                otp: Otp::new(&text("otp"))?,
                req_id: optional(fields, "reqId")
                    .ok_or_else(|| AppError::bad_request("reqId is required"))?,
            },
            VerificationKind::Bank => Self::Bank {
                account: BankAccount::new(&text("account"))?,
                ifsc: Ifsc::new(&text("ifsc"))?,
                name: optional(fields, "name"),
            },
            VerificationKind::McaCin => Self::McaCin {
                cin: Cin::new(&text("cin"))?,
            },
            VerificationKind::Din => Self::Din {
                din: Din::new(&text("din"))?,
            },
            VerificationKind::Passport => Self::Passport {
                file_no: PassportFileNo::new(&text("file_no"))?,
                dob: DateOfBirth::new(&text("dob"))?,
            },
        };
        Ok(payload)
    }

    pub fn kind(&self) -> VerificationKind {
        match self {
            Self::Gst { .. } => VerificationKind::Gst,
            Self::Pan { .. } => VerificationKind::Pan,
            Self::AadhaarSendOtp { .. } => VerificationKind::AadhaarSendOtp,
            Self::AadhaarSubmitOtp { .. } => VerificationKind::AadhaarSubmitOtp,
            Self::Bank { .. } => VerificationKind::Bank,
            Self::McaCin { .. } => VerificationKind::McaCin,
            Self::Din { .. } => VerificationKind::Din,
            Self::Passport { .. } => VerificationKind::Passport,
        }
    }

    /// Normalized fields as sent to the provider
    pub fn to_provider_json(&self) -> Value {
        self.to_json(false)
    }

    /// Fields as stored on the verification record; Aadhaar is masked
    pub fn to_record_json(&self) -> Value {
        self.to_json(true)
    }

    fn to_json(&self, redact: bool) -> Value {
        let aadhaar_value = |a: &Aadhaar| {
            if redact {
                a.masked()
            } else {
                a.as_str().to_string()
            }
        };

        let mut value = match self {
            Self::Gst { gstin, state_code } => json!({ "gstin": gstin, "stateCode": state_code }),
            Self::Pan { pan, holder } => json!({ "pan": pan, "holder": holder }),
            Self::AadhaarSendOtp { aadhaar } => json!({ "aadhaar": aadhaar_value(aadhaar) }),
            Self::AadhaarSubmitOtp {
                aadhaar,
                otp,
                req_id,
            } => {
                let otp = if redact { "XXXXXX" } else { otp.as_str() };
                json!({ "aadhaar": aadhaar_value(aadhaar), "otp": otp, "reqId": req_id })
            }
            Self::Bank {
                account,
                ifsc,
                name,
            } => json!({ "account": account, "ifsc": ifsc, "name": name }),
            Self::McaCin { cin } => json!({ "cin": cin }),
            Self::Din { din } => json!({ "din": din }),
            Self::Passport { file_no, dob } => {
                json!({ "file_no": file_no, "dob": dob.to_string() })
            }
        };

        // Optional fields are omitted rather than sent as null
        if let Some(obj) = value.as_object_mut() {
            obj.retain(|_, v| !v.is_null());
        }
        value
    }
}

/// String or number field as text
fn field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Free-text field, sanitized; blank counts as absent
fn optional(fields: &Map<String, Value>, key: &str) -> Option<String> {
    field(fields, key)
        .map(|s| sanitize_input(&s))
        .filter(|s| !s.is_empty())
}

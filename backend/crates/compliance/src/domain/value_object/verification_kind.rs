//! Verification Kind

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationKind {
    Gst,
    Pan,
    AadhaarSendOtp,
    AadhaarSubmitOtp,
    Bank,
    McaCin,
    Din,
    Passport,
}

impl VerificationKind {
    pub const ALL: [VerificationKind; 8] = [
        VerificationKind::Gst,
        VerificationKind::Pan,
        VerificationKind::AadhaarSendOtp,
        VerificationKind::AadhaarSubmitOtp,
        VerificationKind::Bank,
        VerificationKind::McaCin,
        VerificationKind::Din,
        VerificationKind::Passport,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            VerificationKind::Gst => "gst",
            VerificationKind::Pan => "pan",
            VerificationKind::AadhaarSendOtp => "aadhaar_send_otp",
            VerificationKind::AadhaarSubmitOtp => "aadhaar_submit_otp",
            VerificationKind::Bank => "bank",
            VerificationKind::McaCin => "mca_cin",
            VerificationKind::Din => "din",
            VerificationKind::Passport => "passport",
        }
    }

    /// Short label used in report summaries
    pub const fn label(&self) -> &'static str {
        match self {
            VerificationKind::Gst => "GST",
            VerificationKind::Pan => "PAN",
            VerificationKind::AadhaarSendOtp | VerificationKind::AadhaarSubmitOtp => "Aadhaar",
            VerificationKind::Bank => "Bank account",
            VerificationKind::McaCin => "MCA CIN",
            VerificationKind::Din => "DIN",
            VerificationKind::Passport => "Passport",
        }
    }

    /// Plan API path for this kind
    pub const fn endpoint(&self) -> &'static str {
        match self {
            VerificationKind::Gst => "/Ekyc/GstDetailsAndVerify",
            VerificationKind::Pan => "/Ekyc/PanVerification",
            VerificationKind::AadhaarSendOtp => "/Ekyc/AdharVerification",
            VerificationKind::AadhaarSubmitOtp => "/Ekyc/AdharVerificationOtp",
            VerificationKind::Bank => "/Ekyc/BankVerification",
            VerificationKind::McaCin => "/Ekyc/CinVerification",
            VerificationKind::Din => "/Ekyc/DinVerification",
            VerificationKind::Passport => "/Ekyc/PassportVerification",
        }
    }

    /// Requesting an OTP is free; every other call costs one credit
    pub const fn is_billable(&self) -> bool {
        !matches!(self, VerificationKind::AadhaarSendOtp)
    }

    pub const fn produces_report(&self) -> bool {
        self.is_billable() && !matches!(self, VerificationKind::AadhaarSubmitOtp)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    pub fn parse(code: &str) -> AppResult<Self> {
        Self::from_code(code).ok_or_else(|| {
            AppError::bad_request(format!("Unsupported verification type: {}", code))
        })
    }
}

impl std::fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

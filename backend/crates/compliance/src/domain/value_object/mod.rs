//! Value Objects

pub mod format;
pub mod identifier;
pub mod payload;
pub mod risk;
pub mod sanitize;
pub mod verification_kind;

pub use identifier::{
    Aadhaar, BankAccount, Cin, ContactEmail, DateOfBirth, Din, Gstin, Ifsc, Otp, PassportFileNo,
    Pan, Phone,
};
pub use payload::VerificationPayload;
pub use risk::{RiskLevel, RiskSignals, risk_score};
pub use verification_kind::VerificationKind;

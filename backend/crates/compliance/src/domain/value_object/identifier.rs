//! Identifier Value Objects
//!
//! Each type holds a normalized, format-checked value. Construction
//! failures are 400s whose message names the field.

use chrono::NaiveDate;
use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;

use super::format;

macro_rules! identifier {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal, normalize = $normalize:path,
        check = $check:path, hint = $hint:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const FIELD: &'static str = $field;

            pub fn new(raw: &str) -> AppResult<Self> {
                if !format::is_not_empty(raw) {
                    return Err(AppError::bad_request(format!("{} is required", $field)));
                }
                let value = $normalize(raw);
                if !$check(&value) {
                    return Err(
                        AppError::bad_request(format!("Invalid {} format", $field))
                            .with_action($hint),
                    );
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

fn trimmed(raw: &str) -> String {
    raw.trim().to_string()
}

identifier!(
    /// GST identification number
    Gstin, field = "GSTIN", normalize = format::normalize_upper,
    check = format::is_valid_gstin, hint = "15 characters, e.g. 27AABCU9603R1ZX"
);

identifier!(
    Pan, field = "PAN", normalize = format::normalize_upper,
    check = format::is_valid_pan, hint = "10 characters, e.g. ABCDE1234F"
);

identifier!(
    /// Stored without spaces
    Aadhaar, field = "Aadhaar number", normalize = format::strip_whitespace,
    check = format::is_valid_aadhaar, hint = "12 digits"
);

identifier!(
    Ifsc, field = "IFSC", normalize = format::normalize_upper,
    check = format::is_valid_ifsc, hint = "11 characters, e.g. HDFC0001234"
);

identifier!(
    BankAccount, field = "Account number", normalize = format::strip_whitespace,
    check = format::is_valid_bank_account, hint = "10 to 18 digits"
);

identifier!(
    /// MCA corporate identification number
    Cin, field = "CIN", normalize = format::normalize_upper,
    check = format::is_valid_cin, hint = "21 characters, e.g. U72900MH2015PTC123456"
);

identifier!(
    /// Director identification number
    Din, field = "DIN", normalize = format::strip_whitespace,
    check = format::is_valid_din, hint = "8 digits"
);

identifier!(
    Phone, field = "Phone number", normalize = format::strip_phone_separators,
    check = format::is_valid_phone, hint = "10 digits starting with 6-9, optional +91"
);

identifier!(
    ContactEmail, field = "Email", normalize = trimmed,
    check = format::is_valid_email, hint = "e.g. accounts@vendor.in"
);

identifier!(
    Otp, field = "OTP", normalize = trimmed,
    check = format::is_valid_otp, hint = "6 digits"
);

identifier!(
    PassportFileNo, field = "Passport file number", normalize = format::normalize_upper,
    check = format::is_valid_passport_file_no, hint = "8 to 15 letters or digits"
);

impl Aadhaar {
    /// `XXXXXXXX1234`, safe to store and display
    pub fn masked(&self) -> String {
        format!("XXXXXXXX{}", &self.0[8..])
    }
}

/// Date of birth in the past
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateOfBirth(NaiveDate);

impl DateOfBirth {
    pub fn new(raw: &str) -> AppResult<Self> {
        format::parse_date_of_birth(raw)
            .map(Self)
            .ok_or_else(|| {
                AppError::bad_request("Invalid date of birth")
                    .with_action("Use YYYY-MM-DD, a date in the past")
            })
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for DateOfBirth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

//! Identifier Format Checks
//!
//! Fixed-pattern checks for Indian identifiers and contact fields. Every
//! check normalizes its input the same way the matching value object
//! does, so `is_valid_pan(" abcde1234f ")` is true.

use chrono::{NaiveDate, Utc};

// ============================================================================
// Normalization
// ============================================================================

/// Trim and uppercase (alphanumeric identifiers)
pub fn normalize_upper(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Drop every whitespace character (Aadhaar, account numbers, DIN)
pub fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Drop whitespace and dashes (phone numbers)
pub fn strip_phone_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

// ============================================================================
// Character class helpers
// ============================================================================

fn all_digits(s: &[u8]) -> bool {
    s.iter().all(u8::is_ascii_digit)
}

fn all_upper(s: &[u8]) -> bool {
    s.iter().all(u8::is_ascii_uppercase)
}

fn all_upper_alnum(s: &[u8]) -> bool {
    s.iter()
        .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}

fn digits_between(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && all_digits(s.as_bytes())
}

// ============================================================================
// Identifier checks
// ============================================================================

/// `[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]`
pub fn is_valid_gstin(raw: &str) -> bool {
    let s = normalize_upper(raw);
    let b = s.as_bytes();
    b.len() == 15
        && all_digits(&b[0..2])
        && all_upper(&b[2..7])
        && all_digits(&b[7..11])
        && b[11].is_ascii_uppercase()
        && (matches!(b[12], b'1'..=b'9') || b[12].is_ascii_uppercase())
        && b[13] == b'Z'
        && all_upper_alnum(&b[14..15])
}

/// `[A-Z]{5}[0-9]{4}[A-Z]`
pub fn is_valid_pan(raw: &str) -> bool {
    let s = normalize_upper(raw);
    let b = s.as_bytes();
    b.len() == 10 && all_upper(&b[0..5]) && all_digits(&b[5..9]) && b[9].is_ascii_uppercase()
}

/// Exactly 12 digits once whitespace is removed
pub fn is_valid_aadhaar(raw: &str) -> bool {
    digits_between(&strip_whitespace(raw), 12, 12)
}

/// `[A-Z]{4}0[A-Z0-9]{6}`
pub fn is_valid_ifsc(raw: &str) -> bool {
    let s = normalize_upper(raw);
    let b = s.as_bytes();
    b.len() == 11 && all_upper(&b[0..4]) && b[4] == b'0' && all_upper_alnum(&b[5..11])
}

/// 10 to 18 digits once whitespace is removed
pub fn is_valid_bank_account(raw: &str) -> bool {
    digits_between(&strip_whitespace(raw), 10, 18)
}

/// `[LU][0-9]{5}[A-Z]{2}[0-9]{4}[A-Z]{3}[0-9]{6}`
pub fn is_valid_cin(raw: &str) -> bool {
    let s = normalize_upper(raw);
    let b = s.as_bytes();
    b.len() == 21
        && matches!(b[0], b'L' | b'U')
        && all_digits(&b[1..6])
        && all_upper(&b[6..8])
        && all_digits(&b[8..12])
        && all_upper(&b[12..15])
        && all_digits(&b[15..21])
}

/// 8 digits once whitespace is removed
pub fn is_valid_din(raw: &str) -> bool {
    digits_between(&strip_whitespace(raw), 8, 8)
}

/// `(\+91)?[6-9][0-9]{9}` once spaces and dashes are removed
pub fn is_valid_phone(raw: &str) -> bool {
    let s = strip_phone_separators(raw);
    let local = s.strip_prefix("+91").unwrap_or(&s);
    let b = local.as_bytes();
    b.len() == 10 && matches!(b[0], b'6'..=b'9') && all_digits(&b[1..])
}

/// `[^\s@]+@[^\s@]+\.[^\s@]+`
pub fn is_valid_email(raw: &str) -> bool {
    let s = raw.trim();
    if s.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Some dot must have at least one character on each side
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// 6 digits
pub fn is_valid_otp(raw: &str) -> bool {
    digits_between(raw.trim(), 6, 6)
}

/// 8 to 15 alphanumerics
pub fn is_valid_passport_file_no(raw: &str) -> bool {
    let s = normalize_upper(raw);
    (8..=15).contains(&s.len()) && all_upper_alnum(s.as_bytes())
}

/// `YYYY-MM-DD`, strictly before today (UTC)
pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    (date < Utc::now().date_naive()).then_some(date)
}

pub fn is_valid_date_of_birth(raw: &str) -> bool {
    parse_date_of_birth(raw).is_some()
}

// ============================================================================
// Generic field checks
// ============================================================================

pub fn is_not_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Length of the trimmed value, counted in characters
pub fn has_min_length(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

pub fn has_max_length(value: &str, max: usize) -> bool {
    value.trim().chars().count() <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gstin() {
        assert!(is_valid_gstin("27AABCU9603R1ZX"));
        assert!(is_valid_gstin(" 27aabcu9603r1zx "));
        assert!(is_valid_gstin("29ABCDE1234F2Z5"));

        assert!(!is_valid_gstin("27AABCU9603R1Z"));
        assert!(!is_valid_gstin("27AABCU9603R0ZX"), "13th char cannot be 0");
        assert!(!is_valid_gstin("27AABCU9603R1YX"), "14th char must be Z");
        assert!(!is_valid_gstin("2AAABCU9603R1ZX"));
        assert!(!is_valid_gstin(""));
    }

    #[test]
    fn test_pan() {
        assert!(is_valid_pan("ABCDE1234F"));
        assert!(is_valid_pan("abcde1234f"));
        assert!(!is_valid_pan("ABCD1234F"));
        assert!(!is_valid_pan("ABCDE12345"));
        assert!(!is_valid_pan("1BCDE1234F"));
    }

    #[test]
    fn test_aadhaar() {
        assert!(is_valid_aadhaar("123412341234"));
        assert!(is_valid_aadhaar("1234 1234 1234"));
        assert!(!is_valid_aadhaar("12341234123"));
        assert!(!is_valid_aadhaar("1234-1234-1234"));
        assert!(!is_valid_aadhaar("12341234123A"));
    }

    #[test]
    fn test_ifsc() {
        assert!(is_valid_ifsc("HDFC0001234"));
        assert!(is_valid_ifsc("sbin0a1b2c3"));
        assert!(!is_valid_ifsc("HDFC1001234"), "5th char must be 0");
        assert!(!is_valid_ifsc("HDF00001234"));
        assert!(!is_valid_ifsc("HDFC000123"));
    }

    #[test]
    fn test_bank_account() {
        assert!(is_valid_bank_account("1234567890"));
        assert!(is_valid_bank_account("123456789012345678"));
        assert!(is_valid_bank_account("1234 5678 9012"));
        assert!(!is_valid_bank_account("123456789"));
        assert!(!is_valid_bank_account("1234567890123456789"));
        assert!(!is_valid_bank_account("12345678AB"));
    }

    #[test]
    fn test_cin() {
        assert!(is_valid_cin("U72900MH2015PTC123456"));
        assert!(is_valid_cin("L17110MH1973PLC019786"));
        assert!(!is_valid_cin("X72900MH2015PTC123456"));
        assert!(!is_valid_cin("U72900MH2015PT123456"));
    }

    #[test]
    fn test_din() {
        assert!(is_valid_din("01234567"));
        assert!(is_valid_din("0123 4567"));
        assert!(!is_valid_din("1234567"));
        assert!(!is_valid_din("12345678a"));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+919876543210"));
        assert!(is_valid_phone("+91 98765-43210"));
        assert!(!is_valid_phone("5876543210"), "must start with 6-9");
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone("+449876543210"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("ops@vendor.co.in"));
        assert!(is_valid_email("  ops@vendor.in "));
        assert!(!is_valid_email("ops@vendor"));
        assert!(!is_valid_email("ops@.in"));
        assert!(!is_valid_email("ops@vendor."));
        assert!(!is_valid_email("o ps@vendor.in"));
        assert!(!is_valid_email("ops@@vendor.in"));
        assert!(!is_valid_email("@vendor.in"));
    }

    #[test]
    fn test_otp_and_passport() {
        assert!(is_valid_otp("123456"));
        assert!(!is_valid_otp("12345"));
        assert!(!is_valid_otp("12345a"));

        assert!(is_valid_passport_file_no("MH1234567890123"));
        assert!(is_valid_passport_file_no("ab123456"));
        assert!(!is_valid_passport_file_no("AB12345"));
        assert!(!is_valid_passport_file_no("AB12-34567"));
    }

    #[test]
    fn test_date_of_birth() {
        assert!(is_valid_date_of_birth("1990-04-15"));
        assert!(!is_valid_date_of_birth("1990-4-15"));
        assert!(!is_valid_date_of_birth("1990-02-30"));
        assert!(!is_valid_date_of_birth("15-04-1990"));
        assert!(!is_valid_date_of_birth("2999-01-01"));
    }

    #[test]
    fn test_length_helpers() {
        assert!(is_not_empty(" a "));
        assert!(!is_not_empty("   "));
        assert!(has_min_length("  abc  ", 3));
        assert!(!has_min_length("ab", 3));
        assert!(has_max_length("  abc  ", 3));
        assert!(!has_max_length("abcd", 3));
    }
}

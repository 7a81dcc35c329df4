//! PublicId Value Object
//!
//! Identifier exposed in API responses instead of the internal UUID.
//! Wraps a 21-character Nanoid.

use std::str::FromStr;

use kernel::error::app_error::{AppError, AppResult};
use nid::Nanoid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(Nanoid);

impl PublicId {
    #[inline]
    pub fn new() -> Self {
        Self(Nanoid::new())
    }

    pub fn parse_str(s: &str) -> AppResult<Self> {
        Nanoid::from_str(s)
            .map(PublicId)
            .map_err(|_| AppError::bad_request(format!("Invalid id: {}", s)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PublicId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        PublicId::parse_str(s)
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_new() {
        let a = PublicId::new();
        let b = PublicId::new();
        assert_eq!(a.as_str().len(), 21);
        assert_ne!(a, b);
    }

    #[test]
    fn test_public_id_parse() {
        let id: PublicId = "0123456789abcdefghi01".parse().unwrap();
        assert_eq!(id.to_string(), "0123456789abcdefghi01");
    }

    #[test]
    fn test_public_id_parse_invalid() {
        assert!(PublicId::parse_str("not valid!").is_err());
        assert!(PublicId::parse_str("").is_err());
    }
}

//! API Key Secret
//!
//! `<prefix>_<43 base64url chars>` where the random part is 32 bytes from
//! the OS RNG. Only the SHA-256 hex digest is ever persisted.

use platform::crypto::{random_bytes, sha256_hex, to_base64url};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECRET_BYTES: usize = 32;
const ENCODED_LEN: usize = 43;

/// Environment a key is issued for, visible in the key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEnvironment {
    #[default]
    Live,
    Test,
}

impl KeyEnvironment {
    pub const fn prefix(&self) -> &'static str {
        match self {
            KeyEnvironment::Live => "rv_live",
            KeyEnvironment::Test => "rv_test",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "rv_live" => Some(KeyEnvironment::Live),
            "rv_test" => Some(KeyEnvironment::Test),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "live" => Some(KeyEnvironment::Live),
            "test" => Some(KeyEnvironment::Test),
            _ => None,
        }
    }
}

pub struct ApiKeySecret {
    value: String,
    environment: KeyEnvironment,
}

impl ApiKeySecret {
    pub fn generate(environment: KeyEnvironment) -> Self {
        let random = to_base64url(&random_bytes(SECRET_BYTES));
        Self {
            value: format!("{}_{}", environment.prefix(), random),
            environment,
        }
    }

    /// Parse a secret presented in a request header
    pub fn parse(raw: &str) -> Option<Self> {
        let environment = [KeyEnvironment::Live, KeyEnvironment::Test]
            .into_iter()
            .find(|env| {
                raw.strip_prefix(env.prefix())
                    .is_some_and(|rest| rest.starts_with('_'))
            })?;
        let random = &raw[environment.prefix().len() + 1..];

        let well_formed = random.len() == ENCODED_LEN
            && random
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        well_formed.then(|| Self {
            value: raw.to_string(),
            environment,
        })
    }

    pub fn environment(&self) -> KeyEnvironment {
        self.environment
    }

    pub fn hash(&self) -> String {
        sha256_hex(self.value.as_bytes())
    }

    pub fn last_four(&self) -> String {
        self.value[self.value.len() - 4..].to_string()
    }

    /// The clear secret, shown to the caller exactly once
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for ApiKeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeySecret")
            .field("prefix", &self.environment.prefix())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let secret = ApiKeySecret::generate(KeyEnvironment::Test);
        let value = secret.expose();
        assert!(value.starts_with("rv_test_"));
        assert_eq!(value.len(), "rv_test_".len() + ENCODED_LEN);
        assert_eq!(secret.last_four(), &value[value.len() - 4..]);
    }

    #[test]
    fn test_generate_is_random() {
        let a = ApiKeySecret::generate(KeyEnvironment::Live);
        let b = ApiKeySecret::generate(KeyEnvironment::Live);
        assert_ne!(a.expose(), b.expose());
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_parse_roundtrip() {
        let secret = ApiKeySecret::generate(KeyEnvironment::Live);
        let parsed = ApiKeySecret::parse(secret.expose()).unwrap();
        assert_eq!(parsed.environment(), KeyEnvironment::Live);
        assert_eq!(parsed.hash(), secret.hash());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ApiKeySecret::parse("rv_live_short").is_none());
        assert!(ApiKeySecret::parse(&format!("sk_live_{}", "A".repeat(43))).is_none());
        assert!(ApiKeySecret::parse(&format!("rv_live_{}!", "A".repeat(42))).is_none());
        assert!(ApiKeySecret::parse("").is_none());
        assert!(ApiKeySecret::parse(&format!("rv_live_{}", "A".repeat(43))).is_some());
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let secret = ApiKeySecret::generate(KeyEnvironment::Live);
        let hash = secret.hash();
        assert_eq!(hash.len(), 64);
        assert!(!hash.contains(secret.expose()));
    }

    #[test]
    fn test_debug_redacts() {
        let secret = ApiKeySecret::generate(KeyEnvironment::Live);
        let debug = format!("{:?}", secret);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(secret.expose()));
    }

    #[test]
    fn test_environment_codes() {
        assert_eq!(KeyEnvironment::from_code("test"), Some(KeyEnvironment::Test));
        assert_eq!(KeyEnvironment::from_code("prod"), None);
        assert_eq!(KeyEnvironment::default().prefix(), "rv_live");
    }
}

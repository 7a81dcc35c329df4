//! API Key Entity

use chrono::{DateTime, Utc};
use kernel::id::{ApiKeyId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_object::api_key_secret::{ApiKeySecret, KeyEnvironment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum ApiKeyStatus {
    #[default]
    Active = 0,
    Revoked = 1,
}

impl ApiKeyStatus {
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub const fn code(&self) -> &'static str {
        match self {
            ApiKeyStatus::Active => "active",
            ApiKeyStatus::Revoked => "revoked",
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(ApiKeyStatus::Active),
            1 => Some(ApiKeyStatus::Revoked),
            _ => None,
        }
    }
}

impl fmt::Display for ApiKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Stored half of an API key. The clear secret is never kept.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub owner: UserId,
    pub name: String,
    pub environment: KeyEnvironment,
    pub key_last_four: String,
    pub key_hash: String,
    pub status: ApiKeyStatus,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn issue(owner: UserId, name: impl Into<String>, secret: &ApiKeySecret) -> Self {
        Self {
            id: ApiKeyId::new(),
            owner,
            name: name.into(),
            environment: secret.environment(),
            key_last_four: secret.last_four(),
            key_hash: secret.hash(),
            status: ApiKeyStatus::Active,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    pub fn key_prefix(&self) -> &'static str {
        self.environment.prefix()
    }

    pub fn is_active(&self) -> bool {
        self.status == ApiKeyStatus::Active
    }

    /// Replace the secret in place, keeping the id
    pub fn rotate(&mut self, secret: &ApiKeySecret) {
        self.key_hash = secret.hash();
        self.key_last_four = secret.last_four();
    }

    pub fn revoke(&mut self) {
        self.status = ApiKeyStatus::Revoked;
    }
}

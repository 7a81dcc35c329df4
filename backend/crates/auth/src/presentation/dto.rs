//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::{api_key::ApiKey, user::User};

// ============================================================================
// Sign Up
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub user: UserResponse,
}

// ============================================================================
// Sign In
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Sign in response
///
/// The token is also set as an HttpOnly cookie; API clients that cannot
/// keep cookies send it back as a Bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub expires_at_ms: i64,
    pub user: UserResponse,
}

// ============================================================================
// Session Status
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<i64>,
}

impl SessionStatusResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            user: None,
            expires_at_ms: None,
        }
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub credits: i64,
    pub plan_id: Option<String>,
    pub monthly_credit_limit: i64,
    pub status: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.public_id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.clone(),
            role: user.user_role.code().to_string(),
            credits: user.credits,
            plan_id: user.plan_id.clone(),
            monthly_credit_limit: user.monthly_credit_limit,
            status: user.user_status.code().to_string(),
        }
    }
}

// ============================================================================
// API Keys
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyRequest {
    pub name: String,
    /// "live" (default) or "test"
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub id: String,
    pub name: String,
    pub key_prefix: String,
    pub key_last_four: String,
    pub status: String,
    pub created_at: i64,
    pub last_used_at: Option<i64>,
}

impl From<&ApiKey> for ApiKeyResponse {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id.to_string(),
            name: key.name.clone(),
            key_prefix: key.key_prefix().to_string(),
            key_last_four: key.key_last_four.clone(),
            status: key.status.code().to_string(),
            created_at: key.created_at.timestamp_millis(),
            last_used_at: key.last_used_at.map(|t| t.timestamp_millis()),
        }
    }
}

/// Returned by create and rotate; the only time the secret is shown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedApiKeyResponse {
    #[serde(flatten)]
    pub key: ApiKeyResponse,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyListResponse {
    pub keys: Vec<ApiKeyResponse>,
}

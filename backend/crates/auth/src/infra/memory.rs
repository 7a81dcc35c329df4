//! In-Memory Repository
//!
//! Process-wide store used when no database is configured and in tests.
//! Every repository trait is implemented on one `MemoryAuthStore`; all
//! state sits behind a single `tokio::sync::RwLock`, so credit
//! adjustments are atomic with respect to each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use kernel::id::{ApiKeyId, UserId};
use platform::password::HashCost;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::{api_key::ApiKey, auth::Auth, auth_session::AuthSession, user::User};
use crate::domain::repository::{
    ApiKeyRepository, AuthRepository, AuthSessionRepository, UserRepository,
};
use crate::domain::value_object::{
    email::Email,
    public_id::PublicId,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Password of every seeded demo account
pub const DEMO_PASSWORD: &str = "DemoPass#2024";
pub const DEMO_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEMO_USER_EMAIL: &str = "user@example.com";

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    credentials: HashMap<UserId, Auth>,
    sessions: HashMap<Uuid, AuthSession>,
    api_keys: HashMap<ApiKeyId, ApiKey>,
}

#[derive(Clone, Default)]
pub struct MemoryAuthStore {
    state: Arc<RwLock<State>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the demo admin and demo user
    pub async fn seeded(pepper: Option<&[u8]>, cost: HashCost) -> AuthResult<Self> {
        let store = Self::new();

        let password = RawPassword::for_verification(DEMO_PASSWORD.to_string());
        let seeds = [
            (DEMO_ADMIN_EMAIL, "Admin User", UserRole::Admin, 100, "plan_pro"),
            (DEMO_USER_EMAIL, "Regular User", UserRole::User, 5, "plan_basic"),
        ];

        for (email, name, role, credits, plan) in seeds {
            let mut user = User::new(Email::from_db(email), name);
            user.set_role(role);
            user.apply_plan(plan, credits);

            let hash = UserPassword::from_raw(&password, pepper, cost)?;
            let auth = Auth::new(user.user_id, hash);

            let mut state = store.state.write().await;
            state.credentials.insert(user.user_id, auth);
            state.users.insert(user.user_id, user);
        }

        tracing::info!("Seeded in-memory auth store with demo accounts");
        Ok(store)
    }

    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at_ms >= now_ms);
        Ok((before - state.sessions.len()) as u64)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for MemoryAuthStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| &u.public_id == public_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|u| &u.email == email))
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.write().await;
        let existing = state
            .users
            .get_mut(&user.user_id)
            .ok_or(AuthError::UserNotFound)?;

        let credits = existing.credits;
        *existing = user.clone();
        existing.credits = credits;
        Ok(())
    }

    async fn set_credits(&self, user_id: &UserId, credits: i64) -> AuthResult<()> {
        if credits < 0 {
            return Err(AuthError::Internal("Negative credit balance".to_string()));
        }
        let mut state = self.state.write().await;
        let user = state.users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;
        user.credits = credits;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn adjust_credits(&self, user_id: &UserId, delta: i64) -> AuthResult<Option<i64>> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;

        let Some(balance) = user.credits.checked_add(delta).filter(|b| *b >= 0) else {
            return Ok(None);
        };
        user.credits = balance;
        user.updated_at = Utc::now();
        Ok(Some(balance))
    }
}

// ============================================================================
// Auth Repository Implementation
// ============================================================================

impl AuthRepository for MemoryAuthStore {
    async fn create(&self, auth: &Auth) -> AuthResult<()> {
        let mut state = self.state.write().await;
        state.credentials.insert(auth.user_id, auth.clone());
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        Ok(self.state.read().await.credentials.get(user_id).cloned())
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        let mut state = self.state.write().await;
        state.credentials.insert(auth.user_id, auth.clone());
        Ok(())
    }
}

// ============================================================================
// Auth Session Repository Implementation
// ============================================================================

impl AuthSessionRepository for MemoryAuthStore {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        let mut state = self.state.write().await;
        state.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let state = self.state.read().await;
        let Some(session) = state.sessions.get(&session_id) else {
            return Ok(None);
        };

        if session.client_fingerprint_hash != fingerprint_hash {
            tracing::warn!(session_id = %session_id, "Auth session fingerprint mismatch");
            return Err(AuthError::SessionFingerprintMismatch);
        }
        Ok(Some(session.clone()))
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.sessions.get_mut(&session.session_id) {
            existing.expires_at_ms = session.expires_at_ms;
            existing.last_activity_at = session.last_activity_at;
        }
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.state.write().await.sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| &s.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        MemoryAuthStore::cleanup_expired(self).await
    }
}

// ============================================================================
// API Key Repository Implementation
// ============================================================================

impl ApiKeyRepository for MemoryAuthStore {
    async fn create(&self, key: &ApiKey) -> AuthResult<()> {
        self.state.write().await.api_keys.insert(key.id, key.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ApiKeyId) -> AuthResult<Option<ApiKey>> {
        Ok(self.state.read().await.api_keys.get(id).cloned())
    }

    async fn find_by_hash(&self, key_hash: &str) -> AuthResult<Option<ApiKey>> {
        let state = self.state.read().await;
        Ok(state
            .api_keys
            .values()
            .find(|k| k.key_hash == key_hash)
            .cloned())
    }

    async fn list(&self) -> AuthResult<Vec<ApiKey>> {
        let state = self.state.read().await;
        let mut keys: Vec<ApiKey> = state.api_keys.values().cloned().collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn update(&self, key: &ApiKey) -> AuthResult<()> {
        let mut state = self.state.write().await;
        match state.api_keys.get_mut(&key.id) {
            Some(existing) => {
                *existing = key.clone();
                Ok(())
            }
            None => Err(AuthError::ApiKeyNotFound),
        }
    }

    async fn record_usage(&self, id: &ApiKeyId) -> AuthResult<()> {
        if let Some(key) = self.state.write().await.api_keys.get_mut(id) {
            key.last_used_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_adjust_credits_rejects_overflow_and_negative() {
        let store = MemoryAuthStore::new();
        let mut user = User::new(Email::from_db("ops@vendor.in"), "Ops");
        user.apply_plan("plan_basic", 5);
        UserRepository::create(&store, &user).await.unwrap();

        assert_eq!(store.adjust_credits(&user.user_id, i64::MAX).await.unwrap(), None);
        assert_eq!(store.adjust_credits(&user.user_id, -6).await.unwrap(), None);
        assert_eq!(store.adjust_credits(&user.user_id, -5).await.unwrap(), Some(0));

        let stored = UserRepository::find_by_id(&store, &user.user_id).await.unwrap().unwrap();
        assert_eq!(stored.credits, 0);
    }
}

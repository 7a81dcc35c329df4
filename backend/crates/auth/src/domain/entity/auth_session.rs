//! Auth Session Entity
//!
//! Server-side session referenced by a signed token. Bound to the
//! fingerprint of the client that signed in.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use platform::client::ClientFingerprint;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::value_object::{public_id::PublicId, user_role::UserRole};

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub public_id: PublicId,
    /// Role at session creation
    pub user_role: UserRole,
    pub expires_at_ms: i64,
    pub remember_me: bool,
    pub client_fingerprint_hash: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(
        user: &User,
        remember_me: bool,
        fingerprint: &ClientFingerprint,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            user_id: user.user_id,
            public_id: user.public_id,
            user_role: user.user_role,
            expires_at_ms: (now + ttl).timestamp_millis(),
            remember_me,
            client_fingerprint_hash: fingerprint.hash_vec(),
            client_ip: fingerprint.ip_string(),
            user_agent: fingerprint.user_agent.clone(),
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Slide a remember-me session forward once less than half of
    /// `ttl_long` remains
    pub fn extend_if_needed(&mut self, ttl_long: Duration) {
        if !self.remember_me {
            return;
        }

        let now = Utc::now();
        if self.expires_at_ms < (now + ttl_long / 2).timestamp_millis() {
            self.expires_at_ms = (now + ttl_long).timestamp_millis();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::email::Email;

    fn session(remember_me: bool, ttl: Duration) -> AuthSession {
        let user = User::new(Email::new("s@example.com").unwrap(), "S");
        let fp = ClientFingerprint::new([7u8; 32], None, Some("agent".to_string()));
        AuthSession::new(&user, remember_me, &fp, ttl)
    }

    #[test]
    fn test_new_session_binds_fingerprint() {
        let s = session(false, Duration::hours(12));
        assert_eq!(s.client_fingerprint_hash, vec![7u8; 32]);
        assert_eq!(s.user_agent.as_deref(), Some("agent"));
        assert!(!s.is_expired());
    }

    #[test]
    fn test_expired_session() {
        let s = session(false, Duration::milliseconds(-1));
        assert!(s.is_expired());
    }

    #[test]
    fn test_extend_only_remember_me() {
        let ttl_long = Duration::days(7);

        let mut short = session(false, Duration::hours(1));
        let before = short.expires_at_ms;
        short.extend_if_needed(ttl_long);
        assert_eq!(short.expires_at_ms, before);

        let mut long = session(true, Duration::hours(1));
        long.extend_if_needed(ttl_long);
        assert!(long.expires_at_ms > before + Duration::days(6).num_milliseconds());
    }

    #[test]
    fn test_no_extension_when_plenty_remains() {
        let ttl_long = Duration::days(7);
        let mut s = session(true, ttl_long);
        let before = s.expires_at_ms;
        s.extend_if_needed(ttl_long);
        assert_eq!(s.expires_at_ms, before);
    }
}

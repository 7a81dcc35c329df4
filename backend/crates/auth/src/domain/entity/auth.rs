//! Auth Entity
//!
//! Password hash and login failure tracking, kept apart from `User` so
//! profile queries never touch credential data.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::user_password::UserPassword;

#[derive(Debug, Clone)]
pub struct Auth {
    pub user_id: UserId,
    pub password_hash: UserPassword,
    pub login_failed_count: u16,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Auth {
    /// Consecutive failures before a temporary lockout
    pub const MAX_LOGIN_FAILURES: u16 = 5;
    pub const LOCKOUT_MINUTES: i64 = 15;

    pub fn new(user_id: UserId, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| Utc::now() < until)
    }

    /// Count a failed sign-in. A lock that has run out starts a fresh
    /// count, so the account gets the full number of attempts again.
    pub fn record_failure(&mut self) {
        let now = Utc::now();
        if self.locked_until.is_some_and(|until| until <= now) {
            self.login_failed_count = 0;
            self.locked_until = None;
        }
        self.login_failed_count = self.login_failed_count.saturating_add(1);
        self.last_failed_at = Some(now);
        self.updated_at = now;

        if self.login_failed_count >= Self::MAX_LOGIN_FAILURES {
            self.locked_until = Some(now + chrono::Duration::minutes(Self::LOCKOUT_MINUTES));
        }
    }

    pub fn reset_failures(&mut self) {
        self.login_failed_count = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;
    use platform::password::HashCost;

    fn credentials() -> Auth {
        let raw = RawPassword::new("Vendor#Check2024".to_string()).unwrap();
        let hash = UserPassword::from_raw(&raw, None, HashCost::Minimal).unwrap();
        Auth::new(UserId::new(), hash)
    }

    #[test]
    fn test_lockout_after_max_failures() {
        let mut auth = credentials();
        for _ in 0..Auth::MAX_LOGIN_FAILURES - 1 {
            auth.record_failure();
            assert!(!auth.is_locked());
        }
        auth.record_failure();
        assert!(auth.is_locked());
        assert_eq!(auth.login_failed_count, 5);
    }

    #[test]
    fn test_reset_clears_lock() {
        let mut auth = credentials();
        for _ in 0..Auth::MAX_LOGIN_FAILURES {
            auth.record_failure();
        }
        auth.reset_failures();
        assert!(!auth.is_locked());
        assert_eq!(auth.login_failed_count, 0);
        assert!(auth.last_failed_at.is_none());
    }

    #[test]
    fn test_failure_after_expired_lock_starts_fresh_count() {
        let mut auth = credentials();
        for _ in 0..Auth::MAX_LOGIN_FAILURES {
            auth.record_failure();
        }
        auth.locked_until = Some(Utc::now() - chrono::Duration::seconds(1));

        auth.record_failure();
        assert_eq!(auth.login_failed_count, 1);
        assert!(!auth.is_locked());
        assert!(auth.locked_until.is_none());
    }

    #[test]
    fn test_expired_lock_is_not_locked() {
        let mut auth = credentials();
        auth.locked_until = Some(Utc::now() - chrono::Duration::seconds(1));
        assert!(!auth.is_locked());
    }
}

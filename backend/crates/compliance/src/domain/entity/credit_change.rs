//! Credit Change
//!
//! Ledger row for a manual credit adjustment made by an admin.

use chrono::{DateTime, Utc};
use kernel::id::{CreditChangeId, UserId};

#[derive(Debug, Clone)]
pub struct CreditChange {
    pub id: CreditChangeId,
    pub admin: UserId,
    pub admin_email: String,
    pub user_id: UserId,
    pub user_email: String,
    /// Signed delta, never zero
    pub change: i64,
    pub reason: String,
    pub balance_after: i64,
    pub created_at: DateTime<Utc>,
}

impl CreditChange {
    pub fn new(
        admin: UserId,
        admin_email: impl Into<String>,
        user_id: UserId,
        user_email: impl Into<String>,
        change: i64,
        reason: impl Into<String>,
        balance_after: i64,
    ) -> Self {
        Self {
            id: CreditChangeId::new(),
            admin,
            admin_email: admin_email.into(),
            user_id,
            user_email: user_email.into(),
            change,
            reason: reason.into(),
            balance_after,
            created_at: Utc::now(),
        }
    }
}

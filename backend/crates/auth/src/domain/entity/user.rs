//! User Entity
//!
//! Profile, role and the credit wallet. Credentials live in `Auth`.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{
    email::Email, public_id::PublicId, user_role::UserRole, user_status::UserStatus,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub public_id: PublicId,
    pub email: Email,
    pub name: String,
    pub user_role: UserRole,
    pub user_status: UserStatus,
    /// Remaining verification credits, never negative
    pub credits: i64,
    pub monthly_credit_limit: i64,
    pub plan_id: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Credits granted on sign up
    pub const SIGNUP_CREDITS: i64 = 5;
    /// Plan assigned on sign up
    pub const SIGNUP_PLAN: &'static str = "plan_basic";

    pub fn new(email: Email, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            email,
            name: name.into(),
            user_role: UserRole::default(),
            user_status: UserStatus::default(),
            credits: Self::SIGNUP_CREDITS,
            monthly_credit_limit: Self::SIGNUP_CREDITS,
            plan_id: Some(Self::SIGNUP_PLAN.to_string()),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn can_login(&self) -> bool {
        self.user_status.can_login()
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.user_role = role;
        self.updated_at = Utc::now();
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.user_status = status;
        self.updated_at = Utc::now();
    }

    /// Switch plan and monthly limit, leaving the current balance alone
    pub fn set_plan(&mut self, plan_id: impl Into<String>, monthly_limit: i64) {
        self.plan_id = Some(plan_id.into());
        self.monthly_credit_limit = monthly_limit;
        self.updated_at = Utc::now();
    }

    /// Switch plan and reset the wallet to the plan's monthly allowance
    pub fn apply_plan(&mut self, plan_id: impl Into<String>, monthly_credits: i64) {
        self.plan_id = Some(plan_id.into());
        self.credits = monthly_credits;
        self.monthly_credit_limit = monthly_credits;
        self.updated_at = Utc::now();
    }
}

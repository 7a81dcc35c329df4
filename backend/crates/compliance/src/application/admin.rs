//! Admin Console Use Cases
//!
//! Account suspension, manual credit adjustments and plan changes. Every
//! change is audited with the acting admin as actor.

use std::sync::Arc;

use auth::domain::entity::user::User;
use auth::domain::repository::{AuthSessionRepository, UserRepository};
use auth::domain::value_object::{public_id::PublicId, user_status::UserStatus};
use kernel::error::app_error::AppError;
use kernel::id::UserId;
use serde_json::json;

use crate::application::audit::record_audit;
use crate::domain::entity::{
    audit_entry::{AuditAction, AuditEntry, AuditTarget},
    credit_change::CreditChange,
    plan::Plan,
};
use crate::domain::repository::{AuditRepository, CreditChangeRepository};
use crate::domain::value_object::sanitize::sanitize_input;
use crate::error::{ComplianceError, ComplianceResult};

const REASON_MAX_LENGTH: usize = 500;
/// Largest credit change a single adjustment may apply, in either direction
pub const MAX_CREDIT_CHANGE: i64 = 1_000_000;

pub struct AdminUseCase<U, S, C, A>
where
    U: UserRepository,
    S: AuthSessionRepository,
    C: CreditChangeRepository,
    A: AuditRepository,
{
    users: Arc<U>,
    sessions: Arc<S>,
    credit_changes: Arc<C>,
    audit: Arc<A>,
}

impl<U, S, C, A> AdminUseCase<U, S, C, A>
where
    U: UserRepository,
    S: AuthSessionRepository,
    C: CreditChangeRepository,
    A: AuditRepository,
{
    pub fn new(users: Arc<U>, sessions: Arc<S>, credit_changes: Arc<C>, audit: Arc<A>) -> Self {
        Self {
            users,
            sessions,
            credit_changes,
            audit,
        }
    }

    pub async fn list_users(&self) -> ComplianceResult<Vec<User>> {
        Ok(self.users.list().await?)
    }

    /// Suspend an account and end its sessions
    pub async fn suspend(&self, admin: UserId, target: &str) -> ComplianceResult<User> {
        let mut user = self.find_user(target).await?;
        if user.user_id == admin {
            return Err(ComplianceError::SelfSuspension);
        }

        user.set_status(UserStatus::Suspended);
        self.users.update(&user).await?;
        let ended = self.sessions.delete_all_for_user(&user.user_id).await?;

        self.audit_user(admin, AuditAction::UserSuspended, &user, json!({ "email": user.email.as_str() }))
            .await;
        tracing::info!(public_id = %user.public_id, sessions_ended = ended, "User suspended");
        Ok(user)
    }

    pub async fn activate(&self, admin: UserId, target: &str) -> ComplianceResult<User> {
        let mut user = self.find_user(target).await?;
        user.set_status(UserStatus::Active);
        self.users.update(&user).await?;

        self.audit_user(admin, AuditAction::UserActivated, &user, json!({ "email": user.email.as_str() }))
            .await;
        tracing::info!(public_id = %user.public_id, "User activated");
        Ok(user)
    }

    /// Add or remove credits; the balance cannot go below zero
    pub async fn adjust_credits(
        &self,
        admin: UserId,
        target: &str,
        change: i64,
        reason: &str,
    ) -> ComplianceResult<CreditChange> {
        if change == 0 {
            return Err(AppError::bad_request("Credit change must be non-zero").into());
        }
        if change.unsigned_abs() > MAX_CREDIT_CHANGE as u64 {
            return Err(AppError::bad_request(format!(
                "Credit change must be between -{MAX_CREDIT_CHANGE} and {MAX_CREDIT_CHANGE}"
            ))
            .into());
        }
        let reason = sanitize_input(reason);
        if reason.is_empty() {
            return Err(AppError::bad_request("Reason is required").into());
        }
        if reason.chars().count() > REASON_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Reason must be at most {REASON_MAX_LENGTH} characters"
            ))
            .into());
        }

        let user = self.find_user(target).await?;
        let acting = self
            .users
            .find_by_id(&admin)
            .await?
            .ok_or(ComplianceError::UserNotFound)?;

        let balance_after = self
            .users
            .adjust_credits(&user.user_id, change)
            .await?
            .ok_or(ComplianceError::NegativeBalance)?;

        let record = CreditChange::new(
            admin,
            acting.email.as_str(),
            user.user_id,
            user.email.as_str(),
            change,
            reason,
            balance_after,
        );
        self.credit_changes.create(&record).await?;

        self.audit_user(
            admin,
            AuditAction::CreditsChanged,
            &user,
            json!({
                "change": change,
                "reason": record.reason,
                "balance_after": balance_after,
            }),
        )
        .await;
        tracing::info!(public_id = %user.public_id, change, balance_after, "Credits adjusted");
        Ok(record)
    }

    /// Switch plan and monthly limit; the current balance is kept
    pub async fn change_plan(&self, admin: UserId, target: &str, plan_code: &str) -> ComplianceResult<User> {
        let plan = Plan::find(plan_code)
            .ok_or_else(|| ComplianceError::InvalidPlan(plan_code.trim().to_string()))?;

        let mut user = self.find_user(target).await?;
        let previous = user.plan_id.clone();
        user.set_plan(plan.code, plan.monthly_credits);
        self.users.update(&user).await?;

        self.audit_user(
            admin,
            AuditAction::PlanChanged,
            &user,
            json!({ "plan": plan.code, "previous": previous }),
        )
        .await;
        tracing::info!(public_id = %user.public_id, plan = plan.code, "Plan changed");
        Ok(user)
    }

    pub async fn list_credit_changes(&self) -> ComplianceResult<Vec<CreditChange>> {
        self.credit_changes.list().await
    }

    async fn find_user(&self, public_id: &str) -> ComplianceResult<User> {
        let Ok(public_id) = PublicId::parse_str(public_id) else {
            return Err(ComplianceError::UserNotFound);
        };
        self.users
            .find_by_public_id(&public_id)
            .await?
            .ok_or(ComplianceError::UserNotFound)
    }

    async fn audit_user(&self, admin: UserId, action: AuditAction, user: &User, details: serde_json::Value) {
        record_audit(
            self.audit.as_ref(),
            AuditEntry::new(
                admin,
                action,
                AuditTarget::User,
                Some(user.public_id.to_string()),
                details,
            ),
        )
        .await;
    }
}

//! Credits & Dashboard

use std::collections::HashSet;
use std::sync::Arc;

use auth::domain::entity::user::User;
use auth::domain::repository::UserRepository;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use kernel::id::UserId;

use crate::domain::repository::{ReportRepository, VerificationRepository};
use crate::domain::value_object::RiskLevel;
use crate::error::{ComplianceError, ComplianceResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditBalance {
    pub balance: i64,
    pub monthly_limit: i64,
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub credits_remaining: i64,
    pub credits_total: i64,
    pub verifications_this_month: u64,
    pub total_reports: usize,
    pub high_risk_vendors: usize,
}

pub struct DashboardUseCase<U, V, Rp>
where
    U: UserRepository,
    V: VerificationRepository,
    Rp: ReportRepository,
{
    users: Arc<U>,
    verifications: Arc<V>,
    reports: Arc<Rp>,
}

impl<U, V, Rp> DashboardUseCase<U, V, Rp>
where
    U: UserRepository,
    V: VerificationRepository,
    Rp: ReportRepository,
{
    pub fn new(users: Arc<U>, verifications: Arc<V>, reports: Arc<Rp>) -> Self {
        Self {
            users,
            verifications,
            reports,
        }
    }

    pub async fn balance(&self, user_id: &UserId) -> ComplianceResult<CreditBalance> {
        let user = self.user(user_id).await?;
        Ok(CreditBalance {
            balance: user.credits,
            monthly_limit: user.monthly_credit_limit,
            plan_id: user.plan_id,
        })
    }

    pub async fn stats(&self, user_id: &UserId) -> ComplianceResult<DashboardStats> {
        let user = self.user(user_id).await?;
        let verifications_this_month = self
            .verifications
            .count_by_owner_since(user_id, month_start(Utc::now()))
            .await?;

        let reports = self.reports.list_by_owner(user_id).await?;
        let high_risk_vendors = reports
            .iter()
            .filter(|r| r.risk_level == RiskLevel::High)
            .map(|r| r.vendor_key())
            .collect::<HashSet<_>>()
            .len();

        Ok(DashboardStats {
            credits_remaining: user.credits,
            credits_total: user.monthly_credit_limit,
            verifications_this_month,
            total_reports: reports.len(),
            high_risk_vendors,
        })
    }

    async fn user(&self, user_id: &UserId) -> ComplianceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ComplianceError::UserNotFound)
    }
}

/// First instant of the UTC month containing `now`
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

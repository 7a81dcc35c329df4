//! Report Queries

use std::sync::Arc;

use kernel::id::{ReportId, UserId};

use crate::domain::entity::report::Report;
use crate::domain::repository::ReportRepository;
use crate::error::{ComplianceError, ComplianceResult};

pub struct ReportQueries<Rp>
where
    Rp: ReportRepository,
{
    reports: Arc<Rp>,
}

impl<Rp> ReportQueries<Rp>
where
    Rp: ReportRepository,
{
    pub fn new(reports: Arc<Rp>) -> Self {
        Self { reports }
    }

    pub async fn list(&self, owner: &UserId) -> ComplianceResult<Vec<Report>> {
        self.reports.list_by_owner(owner).await
    }

    pub async fn get(&self, owner: &UserId, id: &ReportId) -> ComplianceResult<Report> {
        self.reports
            .find_by_id(id)
            .await?
            .filter(|r| r.is_owned_by(owner))
            .ok_or(ComplianceError::ReportNotFound)
    }
}

//! Bulk Upload Job

use chrono::{DateTime, Utc};
use kernel::id::{BulkJobId, ReportId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
}

impl JobStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            _ => None,
        }
    }
}

/// One failed CSV row; `row` is 1-based over data rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub vendor: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct BulkJob {
    pub id: BulkJobId,
    pub owner: UserId,
    pub name: String,
    pub status: JobStatus,
    pub total_rows: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
    pub report_ids: Vec<ReportId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BulkJob {
    pub fn new(owner: UserId, name: impl Into<String>, total_rows: usize) -> Self {
        let now = Utc::now();
        Self {
            id: BulkJobId::new(),
            owner,
            name: name.into(),
            status: JobStatus::Pending,
            total_rows,
            success_count: 0,
            error_count: 0,
            errors: Vec::new(),
            report_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
    }

    pub fn record_success(&mut self, report_id: Option<ReportId>) {
        self.success_count += 1;
        self.report_ids.extend(report_id);
        self.updated_at = Utc::now();
    }

    pub fn record_failure(&mut self, row: usize, vendor: impl Into<String>, error: impl Into<String>) {
        self.error_count += 1;
        self.errors.push(RowError {
            row,
            vendor: vendor.into(),
            error: error.into(),
        });
        self.updated_at = Utc::now();
    }

    pub fn finish(&mut self) {
        self.status = JobStatus::Completed;
        self.updated_at = Utc::now();
    }

    pub fn processed_rows(&self) -> usize {
        self.success_count + self.error_count
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle_counts() {
        let mut job = BulkJob::new(UserId::new(), "vendors.csv", 3);
        assert_eq!(job.status, JobStatus::Pending);

        job.start();
        job.record_success(Some(ReportId::new()));
        job.record_failure(2, "Bad Vendor", "Invalid PAN format");
        job.record_success(None);
        job.finish();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.success_count, 2);
        assert_eq!(job.error_count, 1);
        assert_eq!(job.processed_rows(), job.total_rows);
        assert_eq!(job.report_ids.len(), 1);
        assert_eq!(job.errors[0].row, 2);
    }
}

//! Bulk Upload
//!
//! A CSV of vendors becomes one job. Rows are verified one after another
//! in a detached task, running the same verification use case a single
//! request would, as the job owner. The job record is saved after every
//! row so progress is visible while it runs.

use std::sync::Arc;

use auth::domain::repository::UserRepository;
use chrono::Utc;
use kernel::error::app_error::AppError;
use kernel::id::{BulkJobId, UserId};
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;

use crate::application::audit::record_audit;
use crate::application::verification::{VerifyInput, VerifyUseCase};
use crate::domain::entity::{
    audit_entry::{AuditAction, AuditEntry, AuditTarget},
    bulk_job::BulkJob,
};
use crate::domain::provider::VerificationProvider;
use crate::domain::repository::{
    AuditRepository, BulkJobRepository, ReportRepository, VerificationRepository,
};
use crate::domain::value_object::sanitize::sanitize_input;
use crate::error::{ComplianceError, ComplianceResult};

const VENDOR_COLUMN: &str = "vendor";
const TYPE_COLUMN: &str = "type";
const JOB_NAME_MAX_LENGTH: usize = 120;

/// One data row; `row` is 1-based and excludes the header
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub row: usize,
    pub vendor: String,
    pub kind: String,
    /// Remaining non-empty columns, keyed by header name
    pub fields: Map<String, Value>,
}

pub fn is_csv_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("text/csv"))
}

/// Parse a CSV document with a `vendor,type,...` header row
pub fn parse_csv(text: &str) -> ComplianceResult<Vec<CsvRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text)
        .into_iter()
        .filter(|r| r.iter().any(|f| !f.trim().is_empty()));

    let header: Vec<String> = records
        .next()
        .ok_or_else(|| AppError::bad_request("CSV file is empty"))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));
    let (Some(vendor_at), Some(type_at)) = (column(VENDOR_COLUMN), column(TYPE_COLUMN)) else {
        return Err(AppError::bad_request("CSV must have 'vendor' and 'type' columns").into());
    };

    let rows: Vec<CsvRow> = records
        .enumerate()
        .map(|(i, record)| {
            let cell = |at: usize| record.get(at).map(|v| v.trim().to_string()).unwrap_or_default();
            let fields = header
                .iter()
                .enumerate()
                .filter(|(at, name)| *at != vendor_at && *at != type_at && !name.is_empty())
                .filter_map(|(at, name)| {
                    let value = cell(at);
                    (!value.is_empty()).then(|| (name.clone(), Value::String(value)))
                })
                .collect();

            CsvRow {
                row: i + 1,
                vendor: cell(vendor_at),
                kind: cell(type_at),
                fields,
            }
        })
        .collect();

    if rows.is_empty() {
        return Err(AppError::bad_request("CSV file has no data rows").into());
    }
    Ok(rows)
}

/// Split into records of fields. Handles quoted fields with embedded
/// commas, newlines and doubled quotes, and both LF and CRLF endings.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// A created job and the task processing it
pub struct BulkSubmission {
    pub job: BulkJob,
    pub task: JoinHandle<()>,
}

pub struct BulkUploadUseCase<J, V, Rp, A, U, P>
where
    J: BulkJobRepository,
    V: VerificationRepository,
    Rp: ReportRepository,
    A: AuditRepository,
    U: UserRepository,
    P: VerificationProvider,
{
    jobs: Arc<J>,
    audit: Arc<A>,
    verify: VerifyUseCase<V, Rp, A, U, P>,
    max_rows: usize,
}

impl<J, V, Rp, A, U, P> BulkUploadUseCase<J, V, Rp, A, U, P>
where
    J: BulkJobRepository + Send + Sync + 'static,
    V: VerificationRepository + Send + Sync + 'static,
    Rp: ReportRepository + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: VerificationProvider + Send + Sync + 'static,
{
    pub fn new(
        jobs: Arc<J>,
        audit: Arc<A>,
        verify: VerifyUseCase<V, Rp, A, U, P>,
        max_rows: usize,
    ) -> Self {
        Self {
            jobs,
            audit,
            verify,
            max_rows,
        }
    }

    pub async fn submit(
        &self,
        owner: UserId,
        job_name: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> ComplianceResult<BulkSubmission> {
        if !is_csv_content_type(content_type) {
            return Err(AppError::bad_request("Only CSV files are allowed").into());
        }

        let rows = parse_csv(body)?;
        if rows.len() > self.max_rows {
            return Err(AppError::bad_request(format!(
                "CSV file has {} rows; the limit is {}",
                rows.len(),
                self.max_rows
            ))
            .into());
        }

        let name = job_name
            .map(sanitize_input)
            .filter(|n| !n.is_empty())
            .map(|n| n.chars().take(JOB_NAME_MAX_LENGTH).collect())
            .unwrap_or_else(|| format!("Bulk upload {}", Utc::now().format("%Y-%m-%d %H:%M")));

        let job = BulkJob::new(owner, name, rows.len());
        self.jobs.create(&job).await?;

        record_audit(
            self.audit.as_ref(),
            AuditEntry::new(
                owner,
                AuditAction::BulkUploadCreated,
                AuditTarget::Job,
                Some(job.id.to_string()),
                json!({ "total_rows": job.total_rows }),
            ),
        )
        .await;

        tracing::info!(job_id = %job.id, total_rows = job.total_rows, "Bulk upload job created");

        let task = tokio::spawn(process(
            self.jobs.clone(),
            self.verify.clone(),
            job.clone(),
            rows,
        ));
        Ok(BulkSubmission { job, task })
    }
}

async fn process<J, V, Rp, A, U, P>(
    jobs: Arc<J>,
    verify: VerifyUseCase<V, Rp, A, U, P>,
    mut job: BulkJob,
    rows: Vec<CsvRow>,
) where
    J: BulkJobRepository,
    V: VerificationRepository,
    Rp: ReportRepository,
    A: AuditRepository,
    U: UserRepository,
    P: VerificationProvider,
{
    job.start();
    save(jobs.as_ref(), &job).await;

    for row in rows {
        if row.vendor.is_empty() {
            job.record_failure(row.row, "", "Vendor name is required");
            save(jobs.as_ref(), &job).await;
            continue;
        }

        let input = VerifyInput {
            kind: row.kind,
            payload: Value::Object(row.fields),
            vendor_name: Some(row.vendor.clone()),
        };
        match verify.execute(job.owner, input).await {
            Ok(verification) => job.record_success(verification.report_id),
            Err(e) => job.record_failure(row.row, row.vendor, e.to_app_error().message()),
        }
        save(jobs.as_ref(), &job).await;
    }

    job.finish();
    save(jobs.as_ref(), &job).await;
    tracing::info!(
        job_id = %job.id,
        success = job.success_count,
        errors = job.error_count,
        "Bulk upload job completed"
    );
}

async fn save<J: BulkJobRepository>(jobs: &J, job: &BulkJob) {
    if let Err(e) = jobs.update(job).await {
        tracing::error!(job_id = %job.id, error = %e, "Failed to save bulk job progress");
    }
}

pub struct BulkJobQueries<J>
where
    J: BulkJobRepository,
{
    jobs: Arc<J>,
}

impl<J> BulkJobQueries<J>
where
    J: BulkJobRepository,
{
    pub fn new(jobs: Arc<J>) -> Self {
        Self { jobs }
    }

    pub async fn list(&self, owner: &UserId) -> ComplianceResult<Vec<BulkJob>> {
        self.jobs.list_by_owner(owner).await
    }

    pub async fn get(&self, owner: &UserId, id: &BulkJobId) -> ComplianceResult<BulkJob> {
        self.jobs
            .find_by_id(id)
            .await?
            .filter(|j| j.is_owned_by(owner))
            .ok_or(ComplianceError::JobNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_maps_extra_columns() {
        let csv = "vendor,type,gstin,pan\nACME Corp,gst,27AABCU9603R1ZX,\nBeta Ltd,pan,,ABCDE1234F\n";
        let rows = parse_csv(csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].vendor, "ACME Corp");
        assert_eq!(rows[0].kind, "gst");
        assert_eq!(Value::Object(rows[0].fields.clone()), json!({"gstin": "27AABCU9603R1ZX"}));
        assert_eq!(Value::Object(rows[1].fields.clone()), json!({"pan": "ABCDE1234F"}));
    }

    #[test]
    fn test_parse_csv_quotes_and_crlf() {
        let csv = "\u{feff}Type,Vendor,name\r\nbank,\"Shah, Sons & Co\",\"He said \"\"hi\"\"\"\r\n\r\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vendor, "Shah, Sons & Co");
        assert_eq!(rows[0].kind, "bank");
        assert_eq!(rows[0].fields["name"], "He said \"hi\"");
    }

    #[test]
    fn test_parse_csv_requires_columns() {
        let err = parse_csv("name,gstin\nACME,27AABCU9603R1ZX\n").unwrap_err();
        assert_eq!(err.to_string(), "CSV must have 'vendor' and 'type' columns");
    }

    #[test]
    fn test_parse_csv_rejects_empty() {
        assert_eq!(parse_csv("").unwrap_err().to_string(), "CSV file is empty");
        assert_eq!(
            parse_csv("vendor,type\n\n").unwrap_err().to_string(),
            "CSV file has no data rows"
        );
    }

    #[test]
    fn test_csv_content_type() {
        assert!(is_csv_content_type(Some("text/csv")));
        assert!(is_csv_content_type(Some("text/csv; charset=utf-8")));
        assert!(!is_csv_content_type(Some("application/json")));
        assert!(!is_csv_content_type(None));
    }
}

//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use kernel::extract::{AppJson, AppQuery};
use std::sync::Arc;

use auth::Principal;
use auth::domain::repository::{ApiKeyRepository, AuthSessionRepository, UserRepository};

use crate::application::config::ComplianceConfig;
use crate::application::{
    AdminUseCase, AuditQueries, BillingUseCase, BulkJobQueries, BulkUploadUseCase,
    DashboardUseCase, ReportQueries, VerificationQueries, VerifyInput, VerifyPaymentInput,
    VerifyUseCase,
};
use crate::domain::entity::plan::Plan;
use crate::domain::repository::{
    AuditRepository, BulkJobRepository, CreditChangeRepository, PaymentOrderRepository,
    ReportRepository, VerificationRepository,
};
use crate::error::{ComplianceError, ComplianceResult};
use crate::infra::provider::Provider;
use crate::presentation::dto::{
    AdjustCreditsRequest, AdminUserListResponse, AdminUserResponse, AuditEntryResponse,
    AuditLogQuery, AuditLogResponse, BulkJobListResponse, BulkJobResponse, BulkUploadQuery,
    BulkUploadResponse, ChangePlanRequest, CreateOrderRequest, CreateOrderResponse,
    CreditBalanceResponse, CreditChangeListResponse, CreditChangeResponse,
    DashboardStatsResponse, PlanListResponse, ReportListResponse, ReportResponse,
    VerificationListQuery, VerificationListResponse, VerificationResponse, VerifyPaymentRequest,
    VerifyPaymentResponse, VerifyRequest,
};

/// Storage for every compliance record
pub trait ComplianceStore:
    VerificationRepository
    + ReportRepository
    + BulkJobRepository
    + PaymentOrderRepository
    + CreditChangeRepository
    + AuditRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> ComplianceStore for T where
    T: VerificationRepository
        + ReportRepository
        + BulkJobRepository
        + PaymentOrderRepository
        + CreditChangeRepository
        + AuditRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// User accounts, sessions and API keys, owned by the auth crate
pub trait AccountStore:
    UserRepository + AuthSessionRepository + ApiKeyRepository + Clone + Send + Sync + 'static
{
}

impl<T> AccountStore for T where
    T: UserRepository + AuthSessionRepository + ApiKeyRepository + Clone + Send + Sync + 'static
{
}

/// Shared state for compliance handlers
#[derive(Clone)]
pub struct ComplianceState<R, U>
where
    R: ComplianceStore,
    U: AccountStore,
{
    pub store: Arc<R>,
    pub users: Arc<U>,
    pub provider: Arc<Provider>,
    pub config: Arc<ComplianceConfig>,
}

impl<R, U> ComplianceState<R, U>
where
    R: ComplianceStore,
    U: AccountStore,
{
    fn verify_use_case(&self) -> VerifyUseCase<R, R, R, U, Provider> {
        VerifyUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.users.clone(),
            self.provider.clone(),
        )
    }

    fn billing(&self) -> BillingUseCase<R, U, R> {
        BillingUseCase::new(
            self.store.clone(),
            self.users.clone(),
            self.store.clone(),
            self.config.razorpay_key_secret.clone(),
        )
    }

    fn admin(&self) -> AdminUseCase<U, U, R, R> {
        AdminUseCase::new(
            self.users.clone(),
            self.users.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }
}

// ============================================================================
// Verifications
// ============================================================================

/// POST /api/verifications
pub async fn verify<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    AppJson(req): AppJson<VerifyRequest>,
) -> ComplianceResult<(StatusCode, Json<VerificationResponse>)>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let verification = state
        .verify_use_case()
        .execute(
            principal.user_id,
            VerifyInput {
                kind: req.kind,
                payload: req.payload,
                vendor_name: req.vendor_name,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(VerificationResponse::from(&verification)),
    ))
}

/// GET /api/verifications?type=
pub async fn list_verifications<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    AppQuery(query): AppQuery<VerificationListQuery>,
) -> ComplianceResult<Json<VerificationListResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let verifications = VerificationQueries::new(state.store.clone())
        .list(&principal.user_id, query.kind.as_deref())
        .await?;

    Ok(Json(VerificationListResponse {
        verifications: verifications.iter().map(VerificationResponse::from).collect(),
    }))
}

/// GET /api/verifications/{id}
pub async fn get_verification<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ComplianceResult<Json<VerificationResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let id = id.parse().map_err(|_| ComplianceError::VerificationNotFound)?;
    let verification = VerificationQueries::new(state.store.clone())
        .get(&principal.user_id, &id)
        .await?;

    Ok(Json(VerificationResponse::from(&verification)))
}

// ============================================================================
// Reports
// ============================================================================

/// GET /api/reports
pub async fn list_reports<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
) -> ComplianceResult<Json<ReportListResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let reports = ReportQueries::new(state.store.clone())
        .list(&principal.user_id)
        .await?;

    Ok(Json(ReportListResponse {
        reports: reports.iter().map(ReportResponse::from).collect(),
    }))
}

/// GET /api/reports/{id}
pub async fn get_report<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ComplianceResult<Json<ReportResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let id = id.parse().map_err(|_| ComplianceError::ReportNotFound)?;
    let report = ReportQueries::new(state.store.clone())
        .get(&principal.user_id, &id)
        .await?;

    Ok(Json(ReportResponse::from(&report)))
}

// ============================================================================
// Credits & Dashboard
// ============================================================================

/// GET /api/credits/balance
pub async fn credit_balance<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
) -> ComplianceResult<Json<CreditBalanceResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let balance = DashboardUseCase::new(state.users.clone(), state.store.clone(), state.store.clone())
        .balance(&principal.user_id)
        .await?;

    Ok(Json(balance.into()))
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
) -> ComplianceResult<Json<DashboardStatsResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let stats = DashboardUseCase::new(state.users.clone(), state.store.clone(), state.store.clone())
        .stats(&principal.user_id)
        .await?;

    Ok(Json(stats.into()))
}

// ============================================================================
// Plans & Payments
// ============================================================================

/// GET /api/plans
pub async fn list_plans() -> Json<PlanListResponse> {
    Json(PlanListResponse {
        plans: Plan::catalog(),
    })
}

/// POST /api/payment/create-order
pub async fn create_order<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> ComplianceResult<(StatusCode, Json<CreateOrderResponse>)>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let (order, plan) = state
        .billing()
        .create_order(principal.user_id, &req.plan_code)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse::new(
            &order,
            plan,
            &state.config.razorpay_key_id,
            &state.config.merchant_name,
        )),
    ))
}

/// POST /api/payment/verify
pub async fn verify_payment<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    AppJson(req): AppJson<VerifyPaymentRequest>,
) -> ComplianceResult<Json<VerifyPaymentResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let outcome = state
        .billing()
        .verify_payment(
            principal.user_id,
            VerifyPaymentInput {
                order_id: req.order_id,
                payment_id: req.payment_id,
                signature: req.signature,
            },
        )
        .await?;

    Ok(Json(outcome.into()))
}

// ============================================================================
// Bulk Upload
// ============================================================================

/// POST /api/bulk-upload?jobName=
///
/// The body is the raw CSV file; rows are processed after the response.
pub async fn bulk_upload<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    AppQuery(query): AppQuery<BulkUploadQuery>,
    headers: HeaderMap,
    body: String,
) -> ComplianceResult<(StatusCode, Json<BulkUploadResponse>)>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let use_case = BulkUploadUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.verify_use_case(),
        state.config.bulk_max_rows,
    );
    let submission = use_case
        .submit(
            principal.user_id,
            query.job_name.as_deref(),
            content_type,
            &body,
        )
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(BulkUploadResponse {
            success: true,
            job_id: submission.job.id.to_string(),
            total_rows: submission.job.total_rows,
        }),
    ))
}

/// GET /api/bulk-upload/jobs
pub async fn list_bulk_jobs<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
) -> ComplianceResult<Json<BulkJobListResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let jobs = BulkJobQueries::new(state.store.clone())
        .list(&principal.user_id)
        .await?;

    Ok(Json(BulkJobListResponse {
        jobs: jobs.iter().map(BulkJobResponse::from).collect(),
    }))
}

/// GET /api/bulk-upload/jobs/{id}
pub async fn get_bulk_job<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ComplianceResult<Json<BulkJobResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let id = id.parse().map_err(|_| ComplianceError::JobNotFound)?;
    let job = BulkJobQueries::new(state.store.clone())
        .get(&principal.user_id, &id)
        .await?;

    Ok(Json(BulkJobResponse::from(&job)))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /api/admin/users
pub async fn admin_list_users<R, U>(
    State(state): State<ComplianceState<R, U>>,
) -> ComplianceResult<Json<AdminUserListResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let users = state.admin().list_users().await?;

    Ok(Json(AdminUserListResponse {
        users: users.iter().map(AdminUserResponse::from).collect(),
    }))
}

/// POST /api/admin/users/{id}/suspend
pub async fn admin_suspend_user<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ComplianceResult<Json<AdminUserResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let user = state.admin().suspend(principal.user_id, &id).await?;
    Ok(Json(AdminUserResponse::from(&user)))
}

/// POST /api/admin/users/{id}/activate
pub async fn admin_activate_user<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ComplianceResult<Json<AdminUserResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let user = state.admin().activate(principal.user_id, &id).await?;
    Ok(Json(AdminUserResponse::from(&user)))
}

/// POST /api/admin/users/{id}/credits
pub async fn admin_adjust_credits<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AdjustCreditsRequest>,
) -> ComplianceResult<(StatusCode, Json<CreditChangeResponse>)>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let change = state
        .admin()
        .adjust_credits(principal.user_id, &id, req.change, &req.reason)
        .await?;

    Ok((StatusCode::CREATED, Json(CreditChangeResponse::from(&change))))
}

/// PUT /api/admin/users/{id}/plan
pub async fn admin_change_plan<R, U>(
    State(state): State<ComplianceState<R, U>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    AppJson(req): AppJson<ChangePlanRequest>,
) -> ComplianceResult<Json<AdminUserResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let user = state
        .admin()
        .change_plan(principal.user_id, &id, &req.plan_code)
        .await?;

    Ok(Json(AdminUserResponse::from(&user)))
}

/// GET /api/admin/credit-changes
pub async fn admin_credit_changes<R, U>(
    State(state): State<ComplianceState<R, U>>,
) -> ComplianceResult<Json<CreditChangeListResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let changes = state.admin().list_credit_changes().await?;

    Ok(Json(CreditChangeListResponse {
        credit_changes: changes.iter().map(CreditChangeResponse::from).collect(),
    }))
}

/// GET /api/admin/audit-logs?action=
pub async fn admin_audit_logs<R, U>(
    State(state): State<ComplianceState<R, U>>,
    AppQuery(query): AppQuery<AuditLogQuery>,
) -> ComplianceResult<Json<AuditLogResponse>>
where
    R: ComplianceStore,
    U: AccountStore,
{
    let entries = AuditQueries::new(state.store.clone(), state.config.audit_log_limit)
        .list(query.action.as_deref())
        .await?;

    Ok(Json(AuditLogResponse {
        logs: entries.iter().map(AuditEntryResponse::from).collect(),
    }))
}

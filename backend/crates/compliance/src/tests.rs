//! Crate-level tests for compliance: DTOs, errors and the HTTP surface

#[cfg(test)]
mod models_tests {
    use crate::domain::entity::plan::Plan;
    use crate::domain::entity::report::Report;
    use crate::domain::entity::verification::Verification;
    use crate::domain::value_object::{VerificationKind, VerificationPayload};
    use crate::presentation::dto::*;
    use kernel::id::UserId;
    use serde_json::json;

    #[test]
    fn test_verify_request_payload_defaults_to_null() {
        let req: VerifyRequest = serde_json::from_str(r#"{"type":"gst"}"#).unwrap();
        assert_eq!(req.kind, "gst");
        assert!(req.payload.is_null());
        assert!(req.vendor_name.is_none());
    }

    #[test]
    fn test_report_response_is_camel_case() {
        let payload =
            VerificationPayload::parse(VerificationKind::Gst, &json!({"gstin": "27AABCU9603R1ZX"}))
                .unwrap();
        let mut verification =
            Verification::new(UserId::new(), &payload, Some("ACME Corp".to_string()));
        verification.complete(json!({"details": {"status": "Active"}}));
        let report = Report::generate(&verification);

        let json = serde_json::to_value(ReportResponse::from(&report)).unwrap();
        assert_eq!(json["type"], "gst");
        assert_eq!(json["vendorName"], "ACME Corp");
        assert_eq!(json["riskLevel"], "low");
        assert_eq!(json["riskScore"], 20);
        assert_eq!(json["status"], "Active");
        assert_eq!(json["verificationId"], verification.id.to_string());
    }

    #[test]
    fn test_plan_list_serializes_catalog() {
        let json = serde_json::to_value(PlanListResponse {
            plans: Plan::catalog(),
        })
        .unwrap();
        let plans = json["plans"].as_array().unwrap();
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[1]["code"], "STARTER");
        assert_eq!(plans[1]["pricePaise"], 49900);
        assert_eq!(plans[1]["monthlyCredits"], 50);
    }
}

#[cfg(test)]
mod error_tests {
    use crate::domain::provider::ProviderError;
    use crate::error::ComplianceError;
    use auth::AuthError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use kernel::error::app_error::AppError;

    #[test]
    fn test_error_into_response_status_codes() {
        let cases = [
            (ComplianceError::VerificationNotFound, StatusCode::NOT_FOUND),
            (ComplianceError::InsufficientCredits, StatusCode::PAYMENT_REQUIRED),
            (ComplianceError::InvalidSignature, StatusCode::BAD_REQUEST),
            (ComplianceError::OrderAlreadyPaid, StatusCode::CONFLICT),
            (ComplianceError::SelfSuspension, StatusCode::BAD_REQUEST),
            (
                ComplianceError::Provider(ProviderError::Timeout),
                StatusCode::BAD_GATEWAY,
            ),
            (ComplianceError::Auth(AuthError::Forbidden), StatusCode::FORBIDDEN),
            (
                ComplianceError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_insufficient_credits_suggests_upgrade() {
        let app = ComplianceError::InsufficientCredits.to_app_error();
        assert_eq!(app.message(), "Insufficient credits. Please upgrade your plan.");
        assert_eq!(app.action(), Some("Upgrade your plan"));
    }

    #[test]
    fn test_validation_keeps_message_and_action() {
        let err: ComplianceError = AppError::bad_request("Invalid PAN format")
            .with_action("10 characters, e.g. ABCDE1234F")
            .into();
        let app = err.to_app_error();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.message(), "Invalid PAN format");
        assert_eq!(app.action(), Some("10 characters, e.g. ABCDE1234F"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app = ComplianceError::Internal("pool exhausted at 10.0.0.3".into()).to_app_error();
        assert_eq!(app.message(), "Internal server error");
    }
}

#[cfg(test)]
mod router_tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use auth::AuthConfig;
    use auth::domain::repository::UserRepository;
    use auth::domain::value_object::email::Email;
    use auth::infra::memory::{DEMO_ADMIN_EMAIL, DEMO_PASSWORD, DEMO_USER_EMAIL, MemoryAuthStore};
    use auth::presentation::router::auth_router;
    use axum::Router;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use kernel::id::UserId;
    use platform::crypto::hmac_sha256_hex;
    use platform::password::HashCost;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::application::config::{ComplianceConfig, PlanApiSettings};
    use crate::infra::memory::MemoryComplianceStore;
    use crate::infra::plan_api::PlanApiProvider;
    use crate::infra::provider::Provider;
    use crate::infra::sandbox::SandboxProvider;
    use crate::presentation::router::compliance_router;

    const UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Ravono/Test";

    struct TestApp {
        app: Router,
        users: MemoryAuthStore,
        config: ComplianceConfig,
    }

    async fn setup() -> TestApp {
        setup_with(Provider::Sandbox(SandboxProvider::new())).await
    }

    async fn setup_with(provider: Provider) -> TestApp {
        let users = MemoryAuthStore::seeded(None, HashCost::Minimal).await.unwrap();
        let admin_id = user_id(&users, DEMO_ADMIN_EMAIL).await;
        let store = MemoryComplianceStore::seeded(admin_id).await;

        let auth_config = Arc::new(AuthConfig {
            password_cost: HashCost::Minimal,
            ..AuthConfig::development()
        });
        let config = ComplianceConfig::development();
        let users_arc = Arc::new(users.clone());

        let app = Router::new()
            .nest("/api/auth", auth_router(users_arc.clone(), auth_config.clone()))
            .merge(compliance_router(
                Arc::new(store),
                users_arc,
                auth_config,
                Arc::new(provider),
                Arc::new(config.clone()),
            ))
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));

        TestApp { app, users, config }
    }

    async fn user_id(users: &MemoryAuthStore, email: &str) -> UserId {
        let email = Email::new(email).unwrap();
        users.find_by_email(&email).await.unwrap().unwrap().user_id
    }

    async fn credits(users: &MemoryAuthStore, email: &str) -> i64 {
        let email = Email::new(email).unwrap();
        users.find_by_email(&email).await.unwrap().unwrap().credits
    }

    fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::USER_AGENT, UA)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn sign_in(app: &Router, email: &str) -> String {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/signin")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::USER_AGENT, UA)
                    .body(Body::from(
                        json!({ "email": email, "password": DEMO_PASSWORD }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await["token"].as_str().unwrap().to_string()
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        (status, body_json(resp).await)
    }

    // ------------------------------------------------------------------------
    // Verifications & reports
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_routes_require_session() {
        let t = setup().await;
        let resp = t
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/verifications")
                    .header(header::USER_AGENT, UA)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_errors() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let raw = |body: &'static str| {
            Request::builder()
                .method("POST")
                .uri("/api/verifications")
                .header(header::USER_AGENT, UA)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let resp = t.app.clone().oneshot(raw("{not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_json(resp).await;
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("JSON"));

        // Well-formed JSON of the wrong shape
        let (status, body) = call(&t.app, raw(r#"{"type": 7}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());

        let (status, body) = call(
            &t.app,
            csv_request("/api/bulk-upload?jobName=a&jobName=b", &token, "text/csv", "vendor,type\n"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert_eq!(credits(&t.users, DEMO_USER_EMAIL).await, 5);
    }

    #[tokio::test]
    async fn test_verify_gst_creates_report_and_spends_credit() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let (status, body) = call(
            &t.app,
            request(
                "POST",
                "/api/verifications",
                &token,
                Some(json!({
                    "type": "gst",
                    "payload": { "gstin": "27aabcu9603r1zx" },
                    "vendorName": "ACME <b>Corp</b>",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["vendorName"], "ACME bCorp/b");
        assert_eq!(body["payload"]["gstin"], "27AABCU9603R1ZX");
        let report_id = body["reportId"].as_str().unwrap().to_string();
        assert_eq!(credits(&t.users, DEMO_USER_EMAIL).await, 4);

        let (status, report) = call(
            &t.app,
            request("GET", &format!("/api/reports/{report_id}"), &token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["riskLevel"], "low");
        assert_eq!(report["status"], "Active");

        let (_, list) = call(&t.app, request("GET", "/api/reports", &token, None)).await;
        assert_eq!(list["reports"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_verify_rejects_bad_input_without_charging() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let (status, body) = call(
            &t.app,
            request(
                "POST",
                "/api/verifications",
                &token,
                Some(json!({ "type": "voter_id", "payload": {} })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported verification type: voter_id");

        let (status, body) = call(
            &t.app,
            request(
                "POST",
                "/api/verifications",
                &token,
                Some(json!({ "type": "pan", "payload": { "pan": "ABC" } })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid PAN format");
        assert_eq!(credits(&t.users, DEMO_USER_EMAIL).await, 5);
    }

    #[tokio::test]
    async fn test_zero_credits_is_payment_required() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;
        let id = user_id(&t.users, DEMO_USER_EMAIL).await;
        t.users.set_credits(&id, 0).await.unwrap();

        let (status, body) = call(
            &t.app,
            request(
                "POST",
                "/api/verifications",
                &token,
                Some(json!({ "type": "din", "payload": { "din": "01234567" } })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["error"], "Insufficient credits. Please upgrade your plan.");

        // Sending an OTP is free
        let (status, body) = call(
            &t.app,
            request(
                "POST",
                "/api/verifications",
                &token,
                Some(json!({ "type": "aadhaar_send_otp", "payload": { "aadhaar": "1234 5678 9012" } })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["result"]["reqId"].as_str().unwrap().starts_with("sbx_"));
        assert_eq!(body["payload"]["aadhaar"], "XXXXXXXX9012");
        assert!(body["reportId"].is_null());
    }

    #[tokio::test]
    async fn test_provider_failure_refunds_credit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "down"})))
            .mount(&server)
            .await;

        let settings = PlanApiSettings {
            timeout: Duration::from_secs(2),
            ..PlanApiSettings::new(server.uri())
        };
        let provider = Provider::PlanApi(PlanApiProvider::new(&settings).unwrap());
        let t = setup_with(provider).await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let (status, _) = call(
            &t.app,
            request(
                "POST",
                "/api/verifications",
                &token,
                Some(json!({ "type": "pan", "payload": { "pan": "ABCDE1234F" } })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(credits(&t.users, DEMO_USER_EMAIL).await, 5);

        let (_, list) = call(&t.app, request("GET", "/api/verifications?type=pan", &token, None)).await;
        let records = list["verifications"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["status"], "failed");
        assert!(records[0]["result"]["error"].is_string());
    }

    #[tokio::test]
    async fn test_foreign_verification_is_not_found() {
        let t = setup().await;
        let admin_token = sign_in(&t.app, DEMO_ADMIN_EMAIL).await;
        let user_token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let (_, list) = call(&t.app, request("GET", "/api/verifications", &admin_token, None)).await;
        let records = list["verifications"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        let id = records[0]["id"].as_str().unwrap();

        let (status, _) = call(
            &t.app,
            request("GET", &format!("/api/verifications/{id}"), &admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &t.app,
            request("GET", &format!("/api/verifications/{id}"), &user_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &t.app,
            request("GET", "/api/verifications/not-a-uuid", &user_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ------------------------------------------------------------------------
    // Credits & dashboard
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_balance_and_dashboard_stats() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        for gstin in ["99AABCU9603R1ZX", "27AABCU9603R1ZX"] {
            let (status, _) = call(
                &t.app,
                request(
                    "POST",
                    "/api/verifications",
                    &token,
                    Some(json!({ "type": "gst", "payload": { "gstin": gstin }, "vendorName": gstin })),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, balance) = call(&t.app, request("GET", "/api/credits/balance", &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(balance, json!({ "balance": 3, "monthlyLimit": 5, "planId": "plan_basic" }));

        let (_, stats) = call(&t.app, request("GET", "/api/dashboard/stats", &token, None)).await;
        assert_eq!(stats["creditsRemaining"], 3);
        assert_eq!(stats["creditsTotal"], 5);
        assert_eq!(stats["verificationsThisMonth"], 2);
        assert_eq!(stats["totalReports"], 2);
        assert_eq!(stats["highRiskVendors"], 1);
    }

    // ------------------------------------------------------------------------
    // Plans & payments
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_plans_are_public() {
        let t = setup().await;
        let resp = t
            .app
            .clone()
            .oneshot(Request::builder().uri("/api/plans").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["plans"][0]["code"], "FREE");
    }

    #[tokio::test]
    async fn test_payment_flow_upgrades_plan() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let (status, _) = call(
            &t.app,
            request("POST", "/api/payment/create-order", &token, Some(json!({ "planCode": "FREE" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, order) = call(
            &t.app,
            request("POST", "/api/payment/create-order", &token, Some(json!({ "planCode": "starter" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["amount"], 49900);
        assert_eq!(order["currency"], "INR");
        assert_eq!(order["key"], t.config.razorpay_key_id);
        let order_id = order["orderId"].as_str().unwrap().to_string();
        assert!(order_id.starts_with("order_"));

        let (status, body) = call(
            &t.app,
            request(
                "POST",
                "/api/payment/verify",
                &token,
                Some(json!({ "orderId": order_id, "paymentId": "pay_1", "signature": "00ff" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid payment signature");

        let signature = hmac_sha256_hex(
            t.config.razorpay_key_secret.as_bytes(),
            format!("{order_id}|pay_1").as_bytes(),
        );
        let verify = json!({ "orderId": order_id, "paymentId": "pay_1", "signature": signature });

        let (status, body) = call(
            &t.app,
            request("POST", "/api/payment/verify", &token, Some(verify.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["credits"], 50);
        assert_eq!(body["message"], "Successfully upgraded to STARTER plan");
        assert_eq!(credits(&t.users, DEMO_USER_EMAIL).await, 50);

        let (status, _) = call(&t.app, request("POST", "/api/payment/verify", &token, Some(verify))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_payment_for_foreign_order_is_not_found() {
        let t = setup().await;
        let admin_token = sign_in(&t.app, DEMO_ADMIN_EMAIL).await;
        let user_token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let (_, order) = call(
            &t.app,
            request("POST", "/api/payment/create-order", &admin_token, Some(json!({ "planCode": "PRO" }))),
        )
        .await;
        let order_id = order["orderId"].as_str().unwrap();
        let signature = hmac_sha256_hex(
            t.config.razorpay_key_secret.as_bytes(),
            format!("{order_id}|pay_2").as_bytes(),
        );

        let (status, _) = call(
            &t.app,
            request(
                "POST",
                "/api/payment/verify",
                &user_token,
                Some(json!({ "orderId": order_id, "paymentId": "pay_2", "signature": signature })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ------------------------------------------------------------------------
    // Bulk upload
    // ------------------------------------------------------------------------

    fn csv_request(uri: &str, token: &str, content_type: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::USER_AGENT, UA)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_bulk_upload_processes_rows() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;
        let csv = "vendor,type,gstin,pan\r\n\
                   ACME Corp,gst,27AABCU9603R1ZX,\r\n\
                   Bad Row,pan,,NOTAPAN\r\n";

        let (status, body) = call(
            &t.app,
            csv_request("/api/bulk-upload?jobName=March%20vendors", &token, "text/csv", csv),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["success"], true);
        assert_eq!(body["totalRows"], 2);
        let job_id = body["jobId"].as_str().unwrap().to_string();

        let mut job = Value::Null;
        for _ in 0..100 {
            let (status, current) = call(
                &t.app,
                request("GET", &format!("/api/bulk-upload/jobs/{job_id}"), &token, None),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            job = current;
            if job["status"] == "completed" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(job["status"], "completed");
        assert_eq!(job["name"], "March vendors");
        assert_eq!(job["successCount"], 1);
        assert_eq!(job["errorCount"], 1);
        assert_eq!(job["errors"][0]["row"], 2);
        assert_eq!(job["errors"][0]["vendor"], "Bad Row");
        assert_eq!(job["reportIds"].as_array().unwrap().len(), 1);
        assert_eq!(credits(&t.users, DEMO_USER_EMAIL).await, 4);

        let (_, jobs) = call(&t.app, request("GET", "/api/bulk-upload/jobs", &token, None)).await;
        assert_eq!(jobs["jobs"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_upload_rejects_non_csv() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let (status, body) = call(
            &t.app,
            csv_request("/api/bulk-upload", &token, "application/json", "vendor,type\n"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Only CSV files are allowed");

        let (status, body) = call(
            &t.app,
            csv_request("/api/bulk-upload", &token, "text/csv", "vendor,type\n"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "CSV file has no data rows");
    }

    // ------------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------------

    async fn public_id(app: &Router, token: &str) -> String {
        let (_, me) = call(app, request("GET", "/api/auth/user", token, None)).await;
        me["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_role() {
        let t = setup().await;
        let token = sign_in(&t.app, DEMO_USER_EMAIL).await;

        let (status, _) = call(&t.app, request("GET", "/api/admin/users", &token, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin_token = sign_in(&t.app, DEMO_ADMIN_EMAIL).await;
        let (status, body) = call(&t.app, request("GET", "/api/admin/users", &admin_token, None)).await;
        assert_eq!(status, StatusCode::OK);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u["monthlyLimit"].is_i64()));
    }

    #[tokio::test]
    async fn test_admin_suspend_and_activate() {
        let t = setup().await;
        let admin_token = sign_in(&t.app, DEMO_ADMIN_EMAIL).await;
        let user_token = sign_in(&t.app, DEMO_USER_EMAIL).await;
        let admin_public = public_id(&t.app, &admin_token).await;
        let user_public = public_id(&t.app, &user_token).await;

        let (status, _) = call(
            &t.app,
            request("POST", &format!("/api/admin/users/{admin_public}/suspend"), &admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &t.app,
            request("POST", &format!("/api/admin/users/{user_public}/suspend"), &admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "suspended");

        // Suspension ends the user's sessions
        let (status, _) = call(&t.app, request("GET", "/api/reports", &user_token, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            &t.app,
            request("POST", &format!("/api/admin/users/{user_public}/activate"), &admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");

        let (_, logs) = call(&t.app, request("GET", "/api/admin/audit-logs", &admin_token, None)).await;
        let actions: Vec<&str> = logs["logs"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|l| l["action"].as_str())
            .collect();
        assert_eq!(actions, vec!["USER_ACTIVATED", "USER_SUSPENDED"]);
    }

    #[tokio::test]
    async fn test_admin_credit_adjustments() {
        let t = setup().await;
        let admin_token = sign_in(&t.app, DEMO_ADMIN_EMAIL).await;
        let user_token = sign_in(&t.app, DEMO_USER_EMAIL).await;
        let user_public = public_id(&t.app, &user_token).await;
        let uri = format!("/api/admin/users/{user_public}/credits");

        let (status, body) = call(
            &t.app,
            request("POST", &uri, &admin_token, Some(json!({ "change": 10, "reason": "Goodwill" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["balanceAfter"], 15);
        assert_eq!(body["admin"], DEMO_ADMIN_EMAIL);
        assert_eq!(body["userEmail"], DEMO_USER_EMAIL);

        let (status, _) = call(
            &t.app,
            request("POST", &uri, &admin_token, Some(json!({ "change": -100, "reason": "Chargeback" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &t.app,
            request("POST", &uri, &admin_token, Some(json!({ "change": 0, "reason": "Nothing" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &t.app,
            request("POST", &uri, &admin_token, Some(json!({ "change": 3, "reason": "  " }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(credits(&t.users, DEMO_USER_EMAIL).await, 15);

        let (_, changes) =
            call(&t.app, request("GET", "/api/admin/credit-changes", &admin_token, None)).await;
        assert_eq!(changes["creditChanges"].as_array().unwrap().len(), 1);

        let (_, logs) = call(
            &t.app,
            request("GET", "/api/admin/audit-logs?action=CREDITS_CHANGED", &admin_token, None),
        )
        .await;
        assert_eq!(logs["logs"].as_array().unwrap().len(), 1);
        assert_eq!(logs["logs"][0]["targetType"], "USER");

        let (status, body) = call(
            &t.app,
            request("GET", "/api/admin/audit-logs?action=DROP_TABLES", &admin_token, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown audit action: DROP_TABLES");
    }

    #[tokio::test]
    async fn test_admin_credit_change_out_of_range() {
        let t = setup().await;
        let admin_token = sign_in(&t.app, DEMO_ADMIN_EMAIL).await;
        let user_token = sign_in(&t.app, DEMO_USER_EMAIL).await;
        let user_public = public_id(&t.app, &user_token).await;
        let uri = format!("/api/admin/users/{user_public}/credits");

        for change in [i64::MAX, i64::MIN, 1_000_001, -1_000_001] {
            let (status, body) = call(
                &t.app,
                request("POST", &uri, &admin_token, Some(json!({ "change": change, "reason": "x" }))),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "change {change}");
            assert!(body["error"].as_str().unwrap().starts_with("Credit change must be between"));
        }
        assert_eq!(credits(&t.users, DEMO_USER_EMAIL).await, 5);

        let (status, body) = call(
            &t.app,
            request("POST", &uri, &admin_token, Some(json!({ "change": 1_000_000, "reason": "Bulk" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["balanceAfter"], 1_000_005);
    }

    #[tokio::test]
    async fn test_admin_change_plan_keeps_balance() {
        let t = setup().await;
        let admin_token = sign_in(&t.app, DEMO_ADMIN_EMAIL).await;
        let user_token = sign_in(&t.app, DEMO_USER_EMAIL).await;
        let user_public = public_id(&t.app, &user_token).await;
        let uri = format!("/api/admin/users/{user_public}/plan");

        let (status, body) = call(
            &t.app,
            request("PUT", &uri, &admin_token, Some(json!({ "planCode": "PRO" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"], "PRO");
        assert_eq!(body["monthlyLimit"], 200);
        assert_eq!(body["credits"], 5);

        let (status, _) = call(
            &t.app,
            request("PUT", &uri, &admin_token, Some(json!({ "planCode": "GOLD" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[cfg(test)]
mod failure_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use auth::{AuthError, AuthResult};
    use auth::domain::entity::user::User;
    use auth::domain::repository::UserRepository;
    use auth::domain::value_object::{email::Email, public_id::PublicId};
    use auth::infra::memory::{DEMO_USER_EMAIL, MemoryAuthStore};
    use kernel::id::{ReportId, UserId};
    use platform::crypto::hmac_sha256_hex;
    use platform::password::HashCost;
    use serde_json::json;

    use crate::application::{BillingUseCase, VerifyInput, VerifyPaymentInput, VerifyUseCase};
    use crate::domain::entity::report::Report;
    use crate::domain::entity::verification::VerificationStatus;
    use crate::domain::repository::{PaymentOrderRepository, ReportRepository, VerificationRepository};
    use crate::error::{ComplianceError, ComplianceResult};
    use crate::infra::memory::MemoryComplianceStore;
    use crate::infra::sandbox::SandboxProvider;

    const KEY_SECRET: &str = "rzp_test_secret";

    /// Report store whose writes always fail
    struct BrokenReports;

    impl ReportRepository for BrokenReports {
        async fn create(&self, _report: &Report) -> ComplianceResult<()> {
            Err(ComplianceError::Internal("reports table unavailable".into()))
        }

        async fn find_by_id(&self, _id: &ReportId) -> ComplianceResult<Option<Report>> {
            Ok(None)
        }

        async fn list_by_owner(&self, _owner: &UserId) -> ComplianceResult<Vec<Report>> {
            Ok(Vec::new())
        }
    }

    /// User store whose first wallet reset fails
    struct FlakyUsers {
        inner: MemoryAuthStore,
        fail_next_set_credits: AtomicBool,
    }

    impl UserRepository for FlakyUsers {
        async fn create(&self, user: &User) -> AuthResult<()> {
            UserRepository::create(&self.inner, user).await
        }

        async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
            UserRepository::find_by_id(&self.inner, user_id).await
        }

        async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
            UserRepository::find_by_public_id(&self.inner, public_id).await
        }

        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
            UserRepository::find_by_email(&self.inner, email).await
        }

        async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
            UserRepository::exists_by_email(&self.inner, email).await
        }

        async fn list(&self) -> AuthResult<Vec<User>> {
            UserRepository::list(&self.inner).await
        }

        async fn update(&self, user: &User) -> AuthResult<()> {
            UserRepository::update(&self.inner, user).await
        }

        async fn set_credits(&self, user_id: &UserId, credits: i64) -> AuthResult<()> {
            if self.fail_next_set_credits.swap(false, Ordering::SeqCst) {
                return Err(AuthError::Internal("connection reset".into()));
            }
            UserRepository::set_credits(&self.inner, user_id, credits).await
        }

        async fn adjust_credits(&self, user_id: &UserId, delta: i64) -> AuthResult<Option<i64>> {
            UserRepository::adjust_credits(&self.inner, user_id, delta).await
        }
    }

    async fn demo_user(users: &MemoryAuthStore) -> User {
        let email = Email::new(DEMO_USER_EMAIL).unwrap();
        users.find_by_email(&email).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_report_write_failure_refunds_and_fails_record() {
        let users = MemoryAuthStore::seeded(None, HashCost::Minimal).await.unwrap();
        let owner = demo_user(&users).await.user_id;
        let store = Arc::new(MemoryComplianceStore::new());

        let verify = VerifyUseCase::new(
            store.clone(),
            Arc::new(BrokenReports),
            store.clone(),
            Arc::new(users.clone()),
            Arc::new(SandboxProvider::new()),
        );
        let err = verify
            .execute(
                owner,
                VerifyInput {
                    kind: "gst".into(),
                    payload: json!({ "gstin": "27AABCU9603R1ZX" }),
                    vendor_name: Some("ACME Corp".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ComplianceError::Internal(_)));

        assert_eq!(demo_user(&users).await.credits, 5);
        let records = VerificationRepository::list_by_owner(store.as_ref(), &owner, None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, VerificationStatus::Failed);
        assert!(records[0].report_id.is_none());
    }

    #[tokio::test]
    async fn test_failed_upgrade_reopens_order_for_retry() {
        let inner = MemoryAuthStore::seeded(None, HashCost::Minimal).await.unwrap();
        let owner = demo_user(&inner).await.user_id;
        let users = Arc::new(FlakyUsers {
            inner: inner.clone(),
            fail_next_set_credits: AtomicBool::new(true),
        });
        let store = Arc::new(MemoryComplianceStore::new());
        let billing = BillingUseCase::new(store.clone(), users, store.clone(), KEY_SECRET);

        let (order, _) = billing.create_order(owner, "STARTER").await.unwrap();
        let input = VerifyPaymentInput {
            order_id: order.id.clone(),
            payment_id: "pay_1".into(),
            signature: hmac_sha256_hex(KEY_SECRET.as_bytes(), format!("{}|pay_1", order.id).as_bytes()),
        };

        let err = billing.verify_payment(owner, input.clone()).await.unwrap_err();
        assert!(matches!(err, ComplianceError::Auth(_)));
        let stored = PaymentOrderRepository::find_by_id(store.as_ref(), &order.id).await.unwrap().unwrap();
        assert!(!stored.is_paid());

        let outcome = billing.verify_payment(owner, input.clone()).await.unwrap();
        assert_eq!(outcome.credits, 50);
        assert_eq!(demo_user(&inner).await.credits, 50);
        assert_eq!(demo_user(&inner).await.plan_id.as_deref(), Some("STARTER"));

        let err = billing.verify_payment(owner, input).await.unwrap_err();
        assert!(matches!(err, ComplianceError::OrderAlreadyPaid));
    }
}

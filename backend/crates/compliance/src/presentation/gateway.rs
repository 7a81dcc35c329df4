//! Gateway Passthrough
//!
//! Fixed routes forwarded to the upstream verification service. The
//! upstream JSON body is answered with 200 whatever the upstream status;
//! a transport failure or an empty or non-JSON answer becomes a 500.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kernel::extract::AppJson;
use platform::upstream::{UpstreamClient, UpstreamConfig, UpstreamError, UpstreamResponse};
use serde_json::{Value, json};

use crate::application::config::ComplianceConfig;

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy)]
struct GatewayRoute {
    method: Method,
    route: &'static str,
    upstream: &'static str,
    failure: &'static str,
}

const ROUTES: &[GatewayRoute] = &[
    GatewayRoute {
        method: Method::Get,
        route: "/verifications/gst",
        upstream: "/api/verifications/gst",
        failure: "Failed to fetch GST verification history",
    },
    GatewayRoute {
        method: Method::Get,
        route: "/verifications/bank",
        upstream: "/api/verifications/bank",
        failure: "Failed to fetch bank verification history",
    },
    GatewayRoute {
        method: Method::Get,
        route: "/verifications/aadhaar",
        upstream: "/api/verifications/aadhaar",
        failure: "Failed to fetch Aadhaar verification history",
    },
    GatewayRoute {
        method: Method::Post,
        route: "/verify/bank",
        upstream: "/api/verify/bank",
        failure: "Failed to verify bank",
    },
    GatewayRoute {
        method: Method::Post,
        route: "/verify/din",
        upstream: "/api/verify/din",
        failure: "Failed to verify DIN",
    },
    GatewayRoute {
        method: Method::Post,
        route: "/verify/aadhaar/submit-otp",
        upstream: "/api/verify/aadhaar/submit-otp",
        failure: "Failed to submit OTP",
    },
    GatewayRoute {
        method: Method::Get,
        route: "/dashboard",
        upstream: "/api/dashboard",
        failure: "Failed to fetch dashboard data",
    },
];

/// Routes mounted under `/api/gateway`
pub fn gateway_router(config: &ComplianceConfig) -> Result<Router, UpstreamError> {
    let client = UpstreamClient::new(
        UpstreamConfig::new(config.gateway_upstream_url.clone())
            .with_timeout(config.gateway_timeout),
    )?;

    let router = ROUTES.iter().fold(Router::<UpstreamClient>::new(), |router, &route| {
        let method_router = match route.method {
            Method::Get => get(move |State(client): State<UpstreamClient>| async move {
                respond(route, client.get_json(route.upstream, &[]).await)
            }),
            Method::Post => post(
                move |State(client): State<UpstreamClient>, AppJson(body): AppJson<Value>| async move {
                    respond(route, client.post_json(route.upstream, &body).await)
                },
            ),
        };
        router.route(route.route, method_router)
    });

    Ok(router.with_state(client))
}

fn respond(route: GatewayRoute, result: Result<UpstreamResponse, UpstreamError>) -> Response {
    match result {
        Ok(upstream) => {
            if !upstream.status.is_success() {
                tracing::debug!(upstream = route.upstream, status = %upstream.status, "Gateway upstream answered non-2xx");
            }
            (StatusCode::OK, Json(upstream.body)).into_response()
        }
        Err(e) => {
            tracing::error!(upstream = route.upstream, error = %e, "Gateway request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": route.failure })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn router_for(upstream_url: String) -> Router {
        let config = ComplianceConfig {
            gateway_upstream_url: upstream_url,
            gateway_timeout: Duration::from_secs(2),
            ..ComplianceConfig::default()
        };
        gateway_router(&config).unwrap()
    }

    async fn body_json_of(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_passes_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/verifications/gst"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"gstin": "27AABCU9603R1ZX"}])),
            )
            .mount(&server)
            .await;

        let response = router_for(server.uri())
            .oneshot(
                Request::builder()
                    .uri("/verifications/gst")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json_of(response).await,
            json!([{"gstin": "27AABCU9603R1ZX"}])
        );
    }

    #[tokio::test]
    async fn test_post_forwards_body_and_answers_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/verify/din"))
            .and(body_json(json!({"din": "01234567"})))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "bad din"})))
            .mount(&server)
            .await;

        let response = router_for(server.uri())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/verify/din")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"din":"01234567"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json_of(response).await, json!({"detail": "bad din"}));
    }

    #[tokio::test]
    async fn test_non_json_upstream_is_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let response = router_for(server.uri())
            .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json_of(response).await,
            json!({"error": "Failed to fetch dashboard data"})
        );
    }

    #[tokio::test]
    async fn test_empty_upstream_body_is_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let response = router_for(server.uri())
            .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json_of(response).await,
            json!({"error": "Failed to fetch dashboard data"})
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_500() {
        // Nothing listens on port 9 locally
        let response = router_for("http://127.0.0.1:9".to_string())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/verify/aadhaar/submit-otp")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"otp":"123456"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json_of(response).await,
            json!({"error": "Failed to submit OTP"})
        );
    }
}

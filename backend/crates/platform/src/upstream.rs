//! Upstream JSON Client
//!
//! Thin wrapper over `reqwest::Client` for services that speak JSON:
//! a fixed base URL, default headers applied to every request, and a
//! per-request timeout. The response status is handed back to the caller
//! untouched; a body that is not JSON, including an empty one, is an error.

use std::time::Duration;

use http::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid upstream configuration: {0}")]
    Config(String),

    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    #[error("Upstream request failed: {0}")]
    Http(String),

    #[error("Upstream returned a non-JSON body (status {status})")]
    Decode { status: StatusCode },
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout(e.to_string())
        } else {
            UpstreamError::Http(e.to_string())
        }
    }
}

/// Connection settings for one upstream service
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Extra headers sent on every request (auth tokens and the like)
    pub headers: Vec<(String, String)>,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// JSON response as received: status plus parsed body
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| UpstreamError::Config(format!("invalid header name: {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| UpstreamError::Config(format!("invalid value for header {name}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| UpstreamError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, UpstreamError> {
        let request = self.client.get(self.url(path)).query(query);
        Self::send(request).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let request = self.client.post(self.url(path)).json(body);
        Self::send(request).await
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<UpstreamResponse, UpstreamError> {
        let resp = request.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if status.is_server_error() {
            tracing::debug!(%status, "upstream server error");
        }

        // An empty body is not JSON either
        let body = serde_json::from_slice(&bytes).map_err(|_| UpstreamError::Decode { status })?;

        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> UpstreamClient {
        let config = UpstreamConfig::new(format!("{}/", server.uri()))
            .with_timeout(Duration::from_secs(5))
            .with_header("TokenID", "tok-1");
        UpstreamClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_passes_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/verifications/gst"))
            .and(query_param("page", "2"))
            .and(header("TokenID", "tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resp = client
            .get_json("/verifications/gst", &[("page".into(), "2".into())])
            .await
            .unwrap();

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({"items": []}));
    }

    #[tokio::test]
    async fn test_post_json_keeps_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify/bank"))
            .and(body_json(json!({"account": "123"})))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "bad ifsc"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resp = client
            .post_json("verify/bank", &json!({"account": "123"}))
            .await
            .unwrap();

        assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(resp.body["detail"], "bad ifsc");
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_json("/dashboard", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::Decode {
                status: StatusCode::BAD_GATEWAY
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.post_json("/anything", &json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::Decode {
                status: StatusCode::NO_CONTENT
            }
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let config = UpstreamConfig::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2));
        let client = UpstreamClient::new(config).unwrap();
        let err = client.get_json("/x", &[]).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Http(_) | UpstreamError::Timeout(_)));
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let config = UpstreamConfig::new("http://localhost").with_header("TokenID", "bad\nvalue");
        assert!(matches!(
            UpstreamClient::new(config),
            Err(UpstreamError::Config(_))
        ));
    }
}

//! Plan API Provider
//!
//! Live eKYC calls. Each kind POSTs its normalized payload to a fixed
//! endpoint; anything but a 2xx JSON answer is a provider error.

use platform::upstream::{UpstreamClient, UpstreamConfig, UpstreamError};
use serde_json::Value;

use crate::application::config::PlanApiSettings;
use crate::domain::provider::{ProviderError, VerificationProvider};
use crate::domain::value_object::VerificationKind;

#[derive(Debug, Clone)]
pub struct PlanApiProvider {
    client: UpstreamClient,
}

impl PlanApiProvider {
    pub fn new(settings: &PlanApiSettings) -> Result<Self, UpstreamError> {
        let config = UpstreamConfig::new(settings.base_url.clone())
            .with_timeout(settings.timeout)
            .with_header("TokenID", settings.token_id.clone())
            .with_header("ApiUserID", settings.api_user_id.clone())
            .with_header("ApiPassword", settings.api_password.clone());

        Ok(Self {
            client: UpstreamClient::new(config)?,
        })
    }
}

impl From<UpstreamError> for ProviderError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout(_) => ProviderError::Timeout,
            UpstreamError::Decode { .. } => ProviderError::Decode,
            UpstreamError::Config(msg) | UpstreamError::Http(msg) => ProviderError::Transport(msg),
        }
    }
}

impl VerificationProvider for PlanApiProvider {
    fn name(&self) -> &'static str {
        "plan_api"
    }

    async fn verify(&self, kind: VerificationKind, payload: &Value) -> Result<Value, ProviderError> {
        let response = self.client.post_json(kind.endpoint(), payload).await?;
        if !response.status.is_success() {
            return Err(ProviderError::Status(response.status.as_u16()));
        }

        tracing::debug!(kind = kind.code(), status = %response.status, "Plan API answered");
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> PlanApiProvider {
        let settings = PlanApiSettings {
            base_url: server.uri(),
            token_id: "tok".into(),
            api_user_id: "user-7".into(),
            api_password: "pw".into(),
            timeout: Duration::from_millis(500),
        };
        PlanApiProvider::new(&settings).unwrap()
    }

    #[tokio::test]
    async fn test_posts_to_kind_endpoint_with_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Ekyc/GstDetailsAndVerify"))
            .and(header("TokenID", "tok"))
            .and(header("ApiUserID", "user-7"))
            .and(header("ApiPassword", "pw"))
            .and(body_json(json!({"gstin": "27AABCU9603R1ZX"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "success"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .verify(VerificationKind::Gst, &json!({"gstin": "27AABCU9603R1ZX"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"status": "success"}));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "bad token"})))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .verify(VerificationKind::Pan, &json!({"pan": "ABCDE1234F"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status(401)));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .verify(VerificationKind::Din, &json!({"din": "01234567"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout));
    }

    #[tokio::test]
    async fn test_html_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .verify(VerificationKind::McaCin, &json!({"cin": "U72900MH2015PTC123456"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode));
    }
}

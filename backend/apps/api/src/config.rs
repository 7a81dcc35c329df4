//! Server Configuration
//!
//! Read once at startup from the process environment (after `.env`).

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use base64::Engine;
use base64::engine::general_purpose;
use compliance::{ComplianceConfig, PlanApiSettings};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8001";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// `None` runs on the seeded in-memory stores
    pub database_url: Option<String>,
    pub frontend_origins: Vec<String>,
    /// Delay added before every request
    pub mock_latency: Option<Duration>,
    pub auth: AuthConfig,
    pub compliance: ComplianceConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let mock_latency = match var("MOCK_LATENCY_MS") {
            Some(ms) => Some(Duration::from_millis(
                ms.parse().context("MOCK_LATENCY_MS must be a number of milliseconds")?,
            ))
            .filter(|d| !d.is_zero()),
            None => None,
        };

        Ok(Self {
            bind_addr,
            database_url: var("DATABASE_URL"),
            frontend_origins,
            mock_latency,
            auth: auth_config()?,
            compliance: compliance_config(),
        })
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match var("SESSION_SECRET") {
        Some(secret_b64) => {
            let bytes = general_purpose::STANDARD
                .decode(secret_b64.trim())
                .context("SESSION_SECRET must be base64")?;
            let Ok(secret) = <[u8; 32]>::try_from(bytes.as_slice()) else {
                bail!("SESSION_SECRET must decode to 32 bytes, got {}", bytes.len());
            };
            AuthConfig {
                session_secret: secret,
                cookie_secure: !cfg!(debug_assertions),
                ..AuthConfig::default()
            }
        }
        None if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SECRET not set, using a random secret; sessions end on restart");
            AuthConfig::development()
        }
        None => bail!("SESSION_SECRET must be set in production"),
    };

    config.password_pepper = var("PASSWORD_PEPPER").map(String::into_bytes);
    Ok(config)
}

fn compliance_config() -> ComplianceConfig {
    let mut config = if cfg!(debug_assertions) {
        ComplianceConfig::development()
    } else {
        ComplianceConfig::default()
    };

    if let Some(base_url) = var("PLAN_API_BASE_URL") {
        config.plan_api = Some(PlanApiSettings {
            token_id: var("PLAN_API_TOKEN").unwrap_or_default(),
            api_user_id: var("PLAN_API_USER_ID").unwrap_or_default(),
            api_password: var("PLAN_API_PASSWORD").unwrap_or_default(),
            ..PlanApiSettings::new(base_url)
        });
    }
    if let Some(url) = var("GATEWAY_UPSTREAM_URL") {
        config.gateway_upstream_url = url;
    }
    if let Some(key_id) = var("RAZORPAY_KEY_ID") {
        config.razorpay_key_id = key_id;
    }
    if let Some(secret) = var("RAZORPAY_KEY_SECRET") {
        config.razorpay_key_secret = secret;
    }
    if config.razorpay_key_secret.is_empty() {
        tracing::warn!("RAZORPAY_KEY_SECRET not set; payment verification will reject every signature");
    }
    config
}

/// Non-empty environment variable
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

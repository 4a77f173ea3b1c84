// Runtime configuration read from the environment (and `.env`)

use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::domain::errors::{TemplateError, TemplateResult};
use crate::domain::template::DEFAULT_COST_PER_TOKEN;

const DEFAULT_TEMPLATE_SERVICE_URL: &str = "http://localhost:8000/api";
const DEFAULT_USAGE_STORE_URL: &str = "sqlite://costkatana-usage.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Root of the template service API
    pub template_service_url: String,
    /// Bearer token for the template service
    pub template_service_token: Option<String>,
    /// SQLite URL of the usage history store
    pub usage_store_url: String,
    /// Rate used by the cost estimator
    pub cost_per_token: Decimal,
    /// Address the local API listens on
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Reads configuration from process environment variables
    ///
    /// # Variables
    /// - `TEMPLATE_SERVICE_URL`
    /// - `TEMPLATE_SERVICE_TOKEN`
    /// - `USAGE_STORE_URL`
    /// - `COST_PER_TOKEN`
    /// - `BIND_ADDR`
    pub fn from_env() -> TemplateResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> TemplateResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let template_service_url = non_empty("TEMPLATE_SERVICE_URL").unwrap_or_else(|| {
            tracing::warn!("TEMPLATE_SERVICE_URL not set, using default");
            DEFAULT_TEMPLATE_SERVICE_URL.to_string()
        });

        let cost_per_token = match non_empty("COST_PER_TOKEN") {
            Some(raw) => Decimal::from_str(raw.trim())
                .map_err(|e| TemplateError::Config(format!("Invalid COST_PER_TOKEN {}: {}", raw, e)))?,
            None => DEFAULT_COST_PER_TOKEN,
        };
        if cost_per_token.is_sign_negative() {
            return Err(TemplateError::Config(
                "COST_PER_TOKEN cannot be negative".to_string(),
            ));
        }

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| TemplateError::Config(format!("Invalid BIND_ADDR {}: {}", bind_addr, e)))?;

        Ok(Self {
            template_service_url,
            template_service_token: non_empty("TEMPLATE_SERVICE_TOKEN"),
            usage_store_url: non_empty("USAGE_STORE_URL")
                .unwrap_or_else(|| DEFAULT_USAGE_STORE_URL.to_string()),
            cost_per_token,
            bind_addr,
        })
    }
}

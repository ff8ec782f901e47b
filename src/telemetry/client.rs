use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::foundation::error::{FrameError, FrameResult};

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Where download notifications go.
pub struct TelemetryConfig {
    /// Form POST target.
    pub endpoint: String,
    /// Whole-request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl TelemetryConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Best-effort download notifications.
///
/// Posts `name` and `email` as form fields. Nothing about the response, including failure,
/// reaches the caller.
#[derive(Clone, Debug)]
pub struct TelemetryClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TelemetryClient {
    pub fn new(cfg: &TelemetryConfig) -> FrameResult<Self> {
        if !(cfg.endpoint.starts_with("http://") || cfg.endpoint.starts_with("https://")) {
            return Err(FrameError::validation(format!(
                "telemetry endpoint must be an http(s) URL, got '{}'",
                cfg.endpoint
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("build telemetry http client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, name: &str, email: &str) -> Result<reqwest::StatusCode, reqwest::Error> {
        let resp = self
            .http
            .post(&self.endpoint)
            .form(&[("name", name), ("email", email)])
            .send()
            .await?;
        Ok(resp.status())
    }

    /// Spawn the POST on the current runtime and return immediately.
    pub fn send_detached(&self, name: &str, email: &str) -> JoinHandle<()> {
        let client = self.clone();
        let (name, email) = (name.to_string(), email.to_string());
        tokio::spawn(async move {
            match client.post(&name, &email).await {
                Ok(status) if status.is_success() => {
                    debug!(endpoint = %client.endpoint, %status, "telemetry sent");
                }
                Ok(status) => {
                    warn!(endpoint = %client.endpoint, %status, "telemetry rejected");
                }
                Err(err) => {
                    warn!(endpoint = %client.endpoint, error = %err, "telemetry failed");
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/telemetry/client.rs"]
mod tests;

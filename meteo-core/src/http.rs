//! Shared HTTP plumbing for the Open-Meteo and Nominatim clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{config::ApiConfig, error::WeatherError};

const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(config: &ApiConfig) -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(WeatherError::Client)
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Status and body of a finished request.
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub async fn read(
        service: &'static str,
        res: Result<Response, reqwest::Error>,
    ) -> Result<Self, WeatherError> {
        let res = res.map_err(|source| WeatherError::Request { service, source })?;
        let status = res.status();
        let body = res.text().await.map_err(|source| WeatherError::Request { service, source })?;

        tracing::debug!(service, %status, bytes = body.len(), "response received");
        Ok(Self { status, body })
    }

    pub fn json<T: DeserializeOwned>(&self, service: &'static str) -> Result<T, WeatherError> {
        serde_json::from_str(&self.body).map_err(|source| {
            tracing::debug!(service, body = %truncate_body(&self.body), "unexpected response body");
            WeatherError::Parse { service, source }
        })
    }
}

/// Error body returned by Open-Meteo: `{"error": true, "reason": "..."}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApiErrorBody {
    pub error: Option<serde_json::Value>,
    pub reason: Option<String>,
}

impl ApiErrorBody {
    /// Whether `error` is set to anything truthy (`true`, a non-empty string, ...).
    pub fn is_flagged(&self) -> bool {
        match &self.error {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(serde_json::Value::Array(_) | serde_json::Value::Object(_)) => true,
        }
    }

    /// The most specific message the body offers.
    pub fn message(&self) -> Option<String> {
        self.reason.clone().filter(|r| !r.is_empty()).or_else(|| match &self.error {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
    }
}

/// Reason carried by an error body, if it is JSON at all.
pub(crate) fn api_reason(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body).ok().and_then(|b| b.message())
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

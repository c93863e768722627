use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{BriefingError, Result},
    secrets::Secrets,
};

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("weather-briefing/", env!("CARGO_PKG_VERSION"));

/// Provider status code meaning "success".
const SUCCESS_CODE: &str = "200";

/// Thin JSON-over-HTTP client for the QWeather API.
///
/// Every request carries the API key; no retries happen at this layer.
#[derive(Debug, Clone)]
pub struct QWeatherClient {
    api_host: String,
    api_key: String,
    http: Client,
}

impl QWeatherClient {
    pub fn new(secrets: &Secrets, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| BriefingError::Upstream(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            api_host: secrets.api_host.clone(),
            api_key: secrets.api_key.clone(),
            http,
        })
    }

    pub fn with_default_timeout(secrets: &Secrets) -> Result<Self> {
        Self::new(secrets, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// GET `{host}{path}` and return the decoded JSON object.
    pub async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.api_host, path);
        debug!(%url, ?params, "QWeather request");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| transport_error(&url, &err))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|err| transport_error(&url, &err))?;

        if status != StatusCode::OK {
            return Err(BriefingError::Upstream(format!(
                "HTTP {} {}: {}",
                status.as_u16(),
                url,
                truncate_body(&body),
            )));
        }

        let data: Value = serde_json::from_str(&body).map_err(|err| {
            BriefingError::Upstream(format!(
                "Invalid JSON from {url}: {err}: {}",
                truncate_body(&body)
            ))
        })?;

        if !data.is_object() {
            return Err(BriefingError::Upstream(format!(
                "Expected a JSON object from {url}, got: {}",
                truncate_body(&body)
            )));
        }

        let code = provider_code(&data);
        if !code.is_empty() && code != SUCCESS_CODE {
            return Err(BriefingError::Upstream(format!("QWeather code={code} {url}: {data}")));
        }

        Ok(data)
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> BriefingError {
    let kind = if err.is_timeout() { "timed out" } else { "failed" };
    BriefingError::Upstream(format!("Request to {url} {kind}: {err}"))
}

/// The payload's `code` field as text; empty when missing.
fn provider_code(data: &Value) -> String {
    match data.get("code") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 300;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

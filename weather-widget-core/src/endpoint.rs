use std::{fmt::Debug, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{Config, LookupError, LookupRequest, WeatherPayload};

/// Path of the weather proxy, relative to the configured base URL.
pub const WEATHER_PATH: &str = "/api/weather";

/// The backend that turns a city into a weather payload.
#[async_trait]
pub trait WeatherEndpoint: Send + Sync + Debug {
    /// Issue exactly one request for `request`.
    async fn fetch(&self, request: &LookupRequest) -> Result<WeatherPayload, LookupError>;
}

/// `WeatherEndpoint` backed by the HTTP proxy at `<base_url>/api/weather`.
#[derive(Debug, Clone)]
pub struct HttpWeatherEndpoint {
    base_url: String,
    http: Client,
}

impl HttpWeatherEndpoint {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for the weather endpoint")?;

        Ok(Self { base_url: base_url.into(), http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL, with the city percent-encoded (`New York` -> `New%20York`).
    pub fn url_for(&self, request: &LookupRequest) -> String {
        format!(
            "{}{}?city={}",
            self.base_url.trim_end_matches('/'),
            WEATHER_PATH,
            urlencoding::encode(request.city()),
        )
    }

    #[instrument(skip(self, request), fields(city = %request.city()))]
    async fn fetch_current(&self, request: &LookupRequest) -> Result<WeatherPayload, LookupError> {
        let url = self.url_for(request);
        debug!(%url, "requesting weather");

        let res = self.http.get(&url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "weather endpoint rejected lookup");
            let reason = rejection_reason(status, &body)?;
            return Err(LookupError::Rejected { status, reason });
        }

        let payload: WeatherPayload = serde_json::from_str(&body).inspect_err(|e| {
            warn!(error = %e, body = %truncate_body(&body), "malformed weather payload");
        })?;

        Ok(payload)
    }
}

#[async_trait]
impl WeatherEndpoint for HttpWeatherEndpoint {
    async fn fetch(&self, request: &LookupRequest) -> Result<WeatherPayload, LookupError> {
        self.fetch_current(request).await
    }
}

/// Construct the HTTP endpoint from config.
pub fn endpoint_from_config(config: &Config) -> anyhow::Result<HttpWeatherEndpoint> {
    HttpWeatherEndpoint::new(config.base_url(), config.timeout())
}

/// Reason for a non-success response: the body's `error` string if present,
/// else a generic status message. A body that is not JSON is itself an error.
fn rejection_reason(status: StatusCode, body: &str) -> Result<String, LookupError> {
    let value: Value = serde_json::from_str(body)?;

    let reason = value
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()));

    Ok(reason)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

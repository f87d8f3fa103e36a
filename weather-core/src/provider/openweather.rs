use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    config::{Config, UNITS},
    model::UpstreamWeatherRecord,
};

use super::{UpstreamOutcome, WeatherProvider};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    lang: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .field("lang", &self.lang)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, lang: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .user_agent(concat!("weather-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url,
            lang,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.lang.clone(),
            config.request_timeout,
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> UpstreamOutcome {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await;

        // The request URL carries the API key, so it is stripped before logging.
        let res = match res {
            Ok(res) => res,
            Err(e) => {
                let e = e.without_url();
                warn!(error = %e, timeout = e.is_timeout(), "OpenWeather request failed");
                return UpstreamOutcome::Unreachable(e.to_string());
            }
        };

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            debug!(city, "OpenWeather reported unknown city");
            return UpstreamOutcome::NotFound;
        }
        if !status.is_success() {
            warn!(%status, "OpenWeather returned an error status");
            return UpstreamOutcome::Failed(status.as_u16());
        }

        let body = match res.bytes().await {
            Ok(body) => body,
            Err(e) => {
                let e = e.without_url();
                warn!(error = %e, "Failed to read OpenWeather response body");
                return UpstreamOutcome::Unreachable(e.to_string());
            }
        };

        match serde_json::from_slice::<UpstreamWeatherRecord>(&body) {
            Ok(record) => UpstreamOutcome::Found(record),
            Err(e) => {
                warn!(error = %e, body = %truncate_body(&body), "Failed to parse OpenWeather JSON");
                UpstreamOutcome::Malformed(e.to_string())
            }
        }
    }
}

fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}

use crate::{Config, WeatherResponse, error::ProxyError, model::UpstreamWeatherRecord};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Result of a single upstream call, before it is mapped to the public contract.
#[derive(Debug)]
pub enum UpstreamOutcome {
    /// 2xx with a decodable body.
    Found(UpstreamWeatherRecord),
    /// Upstream answered 404.
    NotFound,
    /// Any other non-2xx status.
    Failed(u16),
    /// 2xx whose body could not be decoded.
    Malformed(String),
    /// Connection, DNS, timeout or body read failure.
    Unreachable(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> UpstreamOutcome;
}

/// Map an upstream outcome to the public response or a client-facing error.
pub fn resolve(outcome: UpstreamOutcome, city: &str) -> Result<WeatherResponse, ProxyError> {
    match outcome {
        UpstreamOutcome::Found(record) => record.into_response(city),
        UpstreamOutcome::NotFound => Err(ProxyError::CityNotFound(city.to_string())),
        UpstreamOutcome::Failed(status) => Err(ProxyError::Upstream(status)),
        UpstreamOutcome::Malformed(_) => Err(ProxyError::Mapping { field: "body" }),
        UpstreamOutcome::Unreachable(_) => Err(ProxyError::Unavailable),
    }
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    Ok(Arc::new(OpenWeatherProvider::from_config(config)?))
}

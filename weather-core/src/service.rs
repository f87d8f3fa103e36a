use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    WeatherResponse,
    error::ProxyError,
    provider::{WeatherProvider, resolve},
};

/// Validates a lookup, performs exactly one upstream call and maps the result.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn lookup(&self, city: Option<&str>) -> Result<WeatherResponse, ProxyError> {
        // No trimming: the city is forwarded exactly as supplied.
        let city = city
            .filter(|c| !c.is_empty())
            .ok_or(ProxyError::MissingCity)?;

        let outcome = self.provider.current_weather(city).await;
        let result = resolve(outcome, city);

        match &result {
            Ok(resp) => info!(city, country = %resp.country, "weather lookup served"),
            Err(ProxyError::Mapping { field }) => {
                warn!(city, field, "upstream response missing required field")
            }
            Err(e) => info!(city, status = %e.status(), error = %e, "weather lookup failed"),
        }

        result
    }
}

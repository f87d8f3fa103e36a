use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

/// Inbound query string of `GET /api/weather`.
///
/// `city` is optional at the type level so that a missing parameter is reported as a
/// [`ProxyError::MissingCity`] instead of a framework rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    #[serde(alias = "sehir")]
    pub city: Option<String>,
}

/// Simplified payload returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub city: String,
    pub country: String,
    /// Celsius.
    pub temperature: f64,
    /// Celsius.
    pub feels_like_temperature: f64,
    pub status_summary: String,
    /// Percent.
    pub humidity: u8,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Current-weather document as returned by OpenWeather.
///
/// Every consumed field is optional; presence is checked in
/// [`UpstreamWeatherRecord::into_response`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamWeatherRecord {
    pub name: Option<String>,
    pub sys: Option<UpstreamSys>,
    pub main: Option<UpstreamMain>,
    pub wind: Option<UpstreamWind>,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamSys {
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamWind {
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamCondition {
    pub description: Option<String>,
}

impl UpstreamWeatherRecord {
    /// Reshape into the public schema. `requested_city` is used when the provider omits `name`.
    pub fn into_response(self, requested_city: &str) -> Result<WeatherResponse, ProxyError> {
        let missing = |field: &'static str| ProxyError::Mapping { field };

        let main = self.main.ok_or_else(|| missing("main"))?;
        let description = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| missing("weather[0]"))?
            .description
            .ok_or_else(|| missing("weather[0].description"))?;

        Ok(WeatherResponse {
            city: self.name.unwrap_or_else(|| requested_city.to_string()),
            country: self
                .sys
                .and_then(|sys| sys.country)
                .ok_or_else(|| missing("sys.country"))?,
            temperature: main.temp.ok_or_else(|| missing("main.temp"))?,
            feels_like_temperature: main.feels_like.ok_or_else(|| missing("main.feels_like"))?,
            status_summary: capitalize_first(&description),
            humidity: main.humidity.ok_or_else(|| missing("main.humidity"))?,
            wind_speed: self
                .wind
                .and_then(|wind| wind.speed)
                .ok_or_else(|| missing("wind.speed"))?,
        })
    }
}

/// Uppercase the first character and leave the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Core library for the weather proxy.
//!
//! This crate defines:
//! - Configuration loading (environment, `.toml` file)
//! - The upstream provider abstraction and the OpenWeather client
//! - Public response models and the mapping from the upstream schema
//! - The HTTP router served by `weather-server`

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;

pub use api::router;
pub use config::{Config, ConfigError, FileConfig};
pub use error::ProxyError;
pub use model::{ErrorResponse, WeatherQuery, WeatherResponse};
pub use provider::{OpenWeatherProvider, UpstreamOutcome, WeatherProvider, provider_from_config};
pub use service::WeatherService;

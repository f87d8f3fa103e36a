//! HTTP surface of the proxy.
//!
//! - `GET /api/weather?city=<name>` (localized alias: `GET /api/hava-durumu?sehir=<name>`)
//! - `GET /health`
//!
//! Every failure is returned as an [`ErrorResponse`](crate::model::ErrorResponse) JSON body.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::{
    error::ProxyError,
    model::{HealthResponse, WeatherQuery, WeatherResponse},
    service::WeatherService,
};

pub const WEATHER_PATH: &str = "/api/weather";
pub const WEATHER_PATH_TR: &str = "/api/hava-durumu";

pub fn router(service: WeatherService) -> Router {
    Router::new()
        .route(WEATHER_PATH, get(get_weather))
        .route(WEATHER_PATH_TR, get(get_weather))
        .route("/health", get(health))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn get_weather(
    State(service): State<WeatherService>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherResponse>, ProxyError> {
    let Query(query) = query.map_err(|e| {
        debug!(rejection = %e.body_text(), "rejected weather query string");
        ProxyError::InvalidQuery
    })?;
    service.lookup(query.city.as_deref()).await.map(Json)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn not_found() -> ProxyError {
    ProxyError::RouteNotFound
}

async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

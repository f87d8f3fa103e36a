use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::model::ErrorResponse;

/// Every way a weather request can fail, as seen by the caller.
///
/// Display strings are the messages sent to clients; they never contain upstream bodies.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Query parameter 'city' is required and must not be empty")]
    MissingCity,

    #[error("Invalid query string")]
    InvalidQuery,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Unexpected error from the weather provider")]
    Upstream(u16),

    #[error("Weather provider is unreachable")]
    Unavailable,

    #[error("Weather provider returned an incomplete response")]
    Mapping { field: &'static str },

    #[error("Resource not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingCity | ProxyError::InvalidQuery => StatusCode::UNPROCESSABLE_ENTITY,
            ProxyError::CityNotFound(_) | ProxyError::RouteNotFound => StatusCode::NOT_FOUND,
            ProxyError::Upstream(code) => StatusCode::from_u16(*code)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ProxyError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Mapping { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_body())).into_response()
    }
}

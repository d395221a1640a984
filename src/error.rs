use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::types::run::SessionState;

/// Reasons a waypoint list cannot become a route.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Invalid route: need at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("Invalid route: point {index} ({latitude}, {longitude}) is out of range")]
    CoordinateOutOfRange {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    #[error("Invalid route: point {index} is only {distance:.2} m from the next point")]
    CoincidentPoints { index: usize, distance: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot {action} a session that is {from}")]
    InvalidTransition {
        action: &'static str,
        from: SessionState,
    },
    #[error("Run is no longer active")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Route(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Session(SessionError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            AppError::Session(SessionError::Closed) => StatusCode::GONE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

//! Course guidance for runners: progress along a predefined course,
//! off-course detection and navigation to the course start.

pub mod config;
pub mod engine;
pub mod error;
pub mod live;
pub mod routes;
pub mod state;
pub mod types;

use axum::Router;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::courses::router())
        .merge(routes::navigation::router())
        .merge(routes::runs::router())
        .with_state(state)
}

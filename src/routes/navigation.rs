use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::engine::navigation::NavigationGuide;
use crate::error::AppError;
use crate::state::AppState;
use crate::types::geo::Coordinate;
use crate::types::navigation::{NavRoute, TurnInstruction};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/navigation/route", post(build_route))
        .route("/api/navigation/next-turn", post(next_turn))
}

#[derive(Deserialize)]
struct RouteRequest {
    origin: Coordinate,
    destination: Coordinate,
    #[serde(default)]
    waypoints: Vec<Coordinate>,
}

#[derive(Deserialize)]
struct NextTurnRequest {
    route: NavRoute,
    current: Coordinate,
}

#[derive(Serialize)]
pub(crate) struct NextTurnResponse {
    pub instruction: Option<TurnInstruction>,
    pub icon: Option<&'static str>,
}

impl NextTurnResponse {
    pub(crate) fn new(instruction: Option<TurnInstruction>) -> Self {
        let icon = instruction.as_ref().map(|i| i.turn_type.icon());
        Self { instruction, icon }
    }
}

pub(crate) fn validate_coordinate(coordinate: &Coordinate, field: &str) -> Result<(), AppError> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "{} ({}, {}) is not a valid coordinate",
            field, coordinate.latitude, coordinate.longitude
        )))
    }
}

async fn build_route(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<NavRoute>, AppError> {
    validate_coordinate(&request.origin, "origin")?;
    validate_coordinate(&request.destination, "destination")?;
    for waypoint in &request.waypoints {
        validate_coordinate(waypoint, "waypoint")?;
    }

    let guide = NavigationGuide::straight_line(state.config.guidance.assumed_walking_speed_kmh);
    let route = guide.build_route(request.origin, request.destination, &request.waypoints);

    tracing::info!(
        "Built straight-line route: {} segments, {:.0} m",
        route.segments.len(),
        route.total_distance_meters
    );

    Ok(Json(route))
}

async fn next_turn(
    State(state): State<AppState>,
    Json(request): Json<NextTurnRequest>,
) -> Result<Json<NextTurnResponse>, AppError> {
    validate_coordinate(&request.current, "current")?;

    let guide = NavigationGuide::straight_line(state.config.guidance.assumed_walking_speed_kmh);
    let instruction = guide.next_turn_instruction(&request.route, &request.current);

    Ok(Json(NextTurnResponse::new(instruction)))
}

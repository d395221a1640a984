use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::navigation::NavigationGuide;
use crate::engine::route::Route;
use crate::engine::stages::{MultiStageNavigation, DEFAULT_STAGE_COUNT};
use crate::engine::waypoints::{extract_waypoints, optimize_waypoints, route_info};
use crate::error::AppError;
use crate::routes::navigation::{validate_coordinate, NextTurnResponse};
use crate::state::{AppState, CourseProvider, StoredCourse};
use crate::types::course::{CourseData, RouteInfo};
use crate::types::geo::Coordinate;
use crate::types::navigation::{NavRoute, NavigationStage, StageProgress};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/courses", post(create_course))
        .route("/api/courses/:course_id", get(get_course))
        .route("/api/courses/:course_id/waypoints", get(key_waypoints))
        .route("/api/courses/:course_id/navigate", post(navigate_to_start))
        .route("/api/courses/:course_id/stages", post(plan_stages))
}

const DEFAULT_MAX_WAYPOINTS: usize = 8;

#[derive(Deserialize)]
struct CreateCourseRequest {
    id: Option<String>,
    name: String,
    #[serde(default)]
    area: String,
    waypoints: Vec<Coordinate>,
}

#[derive(Serialize, Deserialize)]
struct CourseResponse {
    course_id: String,
    name: String,
    area: String,
    total_distance_meters: f64,
    info: RouteInfo,
    waypoints: Vec<Coordinate>,
}

impl From<&StoredCourse> for CourseResponse {
    fn from(stored: &StoredCourse) -> Self {
        Self {
            course_id: stored.course.id.clone(),
            name: stored.course.name.clone(),
            area: stored.course.area.clone(),
            total_distance_meters: stored.route.total_distance_meters(),
            info: route_info(stored.route.points()),
            waypoints: stored.route.points().to_vec(),
        }
    }
}

#[derive(Deserialize)]
struct WaypointQuery {
    max: Option<usize>,
    #[serde(default)]
    optimize: bool,
}

#[derive(Serialize)]
struct WaypointResponse {
    course_id: String,
    waypoints: Vec<Coordinate>,
}

#[derive(Deserialize)]
struct PositionRequest {
    current: Coordinate,
    stages: Option<usize>,
}

#[derive(Serialize)]
struct NavigateResponse {
    course_id: String,
    route: NavRoute,
    #[serde(flatten)]
    next_turn: NextTurnResponse,
}

#[derive(Serialize)]
struct StagesResponse {
    plan: MultiStageNavigation,
    current: Option<NavigationStage>,
    progress: StageProgress,
}

fn find_course(state: &AppState, course_id: &str) -> Result<StoredCourse, AppError> {
    state
        .get_course(course_id)
        .ok_or_else(|| AppError::NotFound(format!("course {}", course_id)))
}

async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("Course name is required".to_string()));
    }

    let route = Route::with_min_segment(
        request.waypoints.clone(),
        state.config.guidance.min_segment_meters,
    )?;

    let course = CourseData {
        id: request.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        name: request.name,
        area: request.area,
        waypoints: request.waypoints,
    };
    let stored = state.insert_course(course, route);

    tracing::info!(
        "Registered course {} ({} points, {:.0} m)",
        stored.course.id,
        stored.route.points().len(),
        stored.route.total_distance_meters()
    );

    Ok(Json(CourseResponse::from(&stored)))
}

async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, AppError> {
    let stored = find_course(&state, &course_id)?;
    Ok(Json(CourseResponse::from(&stored)))
}

async fn key_waypoints(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(query): Query<WaypointQuery>,
) -> Result<Json<WaypointResponse>, AppError> {
    let course = state
        .course(&course_id)
        .ok_or_else(|| AppError::NotFound(format!("course {}", course_id)))?;
    let max = query.max.unwrap_or(DEFAULT_MAX_WAYPOINTS);

    let waypoints = if query.optimize {
        optimize_waypoints(&course.waypoints, max)
    } else {
        extract_waypoints(&course.waypoints, max)
    };

    Ok(Json(WaypointResponse {
        course_id,
        waypoints,
    }))
}

async fn navigate_to_start(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(request): Json<PositionRequest>,
) -> Result<Json<NavigateResponse>, AppError> {
    validate_coordinate(&request.current, "current")?;
    let stored = find_course(&state, &course_id)?;

    let guide = NavigationGuide::straight_line(state.config.guidance.assumed_walking_speed_kmh);
    let route = guide.build_route(request.current, stored.route.start(), &[]);
    let instruction = guide.next_turn_instruction(&route, &request.current);

    Ok(Json(NavigateResponse {
        course_id,
        route,
        next_turn: NextTurnResponse::new(instruction),
    }))
}

async fn plan_stages(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(request): Json<PositionRequest>,
) -> Result<Json<StagesResponse>, AppError> {
    validate_coordinate(&request.current, "current")?;
    let course = state
        .course(&course_id)
        .ok_or_else(|| AppError::NotFound(format!("course {}", course_id)))?;

    let plan = MultiStageNavigation::plan(
        request.current,
        &course.waypoints,
        request.stages.unwrap_or(DEFAULT_STAGE_COUNT),
    );

    Ok(Json(StagesResponse {
        current: plan.current().cloned(),
        progress: plan.progress(),
        plan,
    }))
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::verify::{verify_run, VerificationResult};
use crate::error::AppError;
use crate::live::{BroadcastSource, LiveRun, RunRecorder};
use crate::routes::navigation::validate_coordinate;
use crate::state::{ActiveRun, AppState};
use crate::types::geo::{Coordinate, PositionFix};
use crate::types::run::{CompletedRun, RunStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/runs", post(create_run))
        .route("/api/runs/:run_id", get(run_status))
        .route("/api/runs/:run_id/start", post(start_run))
        .route("/api/runs/:run_id/pause", post(pause_run))
        .route("/api/runs/:run_id/resume", post(resume_run))
        .route("/api/runs/:run_id/stop", post(stop_run))
        .route("/api/runs/:run_id/fixes", post(push_fixes))
        .route("/api/runs/:run_id/summary", get(run_summary))
        .route("/api/runs/:run_id/course", get(course_split))
}

#[derive(Deserialize)]
struct CreateRunRequest {
    course_id: String,
}

#[derive(Serialize)]
struct RunResponse {
    run_id: String,
    course_id: String,
    status: RunStatus,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixBatch {
    One(PositionFix),
    Many(Vec<PositionFix>),
}

impl FixBatch {
    fn into_vec(self) -> Vec<PositionFix> {
        match self {
            FixBatch::One(fix) => vec![fix],
            FixBatch::Many(fixes) => fixes,
        }
    }
}

#[derive(Serialize)]
struct FixResponse {
    received: usize,
    delivered: usize,
    status: RunStatus,
}

#[derive(Serialize)]
struct SummaryResponse {
    run: CompletedRun,
    verification: VerificationResult,
}

#[derive(Serialize)]
struct CourseSplitResponse {
    course_id: String,
    segment_index: usize,
    passed: Vec<Coordinate>,
    upcoming: Vec<Coordinate>,
}

fn find_run(state: &AppState, run_id: &str) -> Result<ActiveRun, AppError> {
    state
        .get_run(run_id)
        .ok_or_else(|| AppError::NotFound(format!("run {}", run_id)))
}

fn respond(active: &ActiveRun, status: RunStatus) -> Json<RunResponse> {
    Json(RunResponse {
        run_id: active.run.id().to_string(),
        course_id: active.run.course_id().to_string(),
        status,
    })
}

async fn create_run(
    State(state): State<AppState>,
    Json(request): Json<CreateRunRequest>,
) -> Result<Json<RunResponse>, AppError> {
    let course = state
        .get_course(&request.course_id)
        .ok_or_else(|| AppError::NotFound(format!("course {}", request.course_id)))?;

    let source = BroadcastSource::new();
    let recorder: Arc<dyn RunRecorder> = Arc::new(state.clone());
    let run = LiveRun::spawn(
        Uuid::new_v4().to_string(),
        course.course.id.clone(),
        Arc::clone(&course.route),
        &state.config.guidance,
        &source,
        recorder,
    );

    let active = state.insert_run(run, source);
    let status = active.run.latest_status();
    Ok(respond(&active, status))
}

async fn run_status(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<RunResponse>, AppError> {
    let active = find_run(&state, &run_id)?;
    let status = active.run.status().await;
    Ok(respond(&active, status))
}

async fn start_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<RunResponse>, AppError> {
    let active = find_run(&state, &run_id)?;
    let status = active.run.start().await?;
    Ok(respond(&active, status))
}

async fn pause_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<RunResponse>, AppError> {
    let active = find_run(&state, &run_id)?;
    let status = active.run.pause().await?;
    Ok(respond(&active, status))
}

async fn resume_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<RunResponse>, AppError> {
    let active = find_run(&state, &run_id)?;
    let status = active.run.resume().await?;
    Ok(respond(&active, status))
}

async fn stop_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<CompletedRun>, AppError> {
    let active = find_run(&state, &run_id)?;
    let completed = active.run.stop().await?;
    Ok(Json(completed))
}

async fn push_fixes(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    Json(batch): Json<FixBatch>,
) -> Result<Json<FixResponse>, AppError> {
    let active = find_run(&state, &run_id)?;
    let fixes = batch.into_vec();
    for fix in &fixes {
        validate_coordinate(&fix.coordinate, "fix")?;
    }

    let delivered: usize = fixes
        .iter()
        .map(|fix| active.source.publish(*fix))
        .sum();
    if delivered == 0 && !fixes.is_empty() {
        tracing::warn!("Run {} has no fix subscriber; {} fixes dropped", run_id, fixes.len());
    }

    let status = active.run.status().await;
    Ok(Json(FixResponse {
        received: fixes.len(),
        delivered,
        status,
    }))
}

async fn run_summary(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let run = state
        .get_completed(&run_id)
        .ok_or_else(|| AppError::NotFound(format!("completed run {}", run_id)))?;
    let course = state.get_course(&run.course_id);
    let verification = verify_run(&run.summary, course.as_ref().map(|c| c.route.as_ref()));

    Ok(Json(SummaryResponse { run, verification }))
}

async fn course_split(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<CourseSplitResponse>, AppError> {
    let active = find_run(&state, &run_id)?;
    let course = state
        .get_course(active.run.course_id())
        .ok_or_else(|| AppError::NotFound(format!("course {}", active.run.course_id())))?;

    let segment_index = active.run.latest_status().progress.nearest_route_index;
    let (passed, upcoming) = course.route.split_at_segment(segment_index);

    Ok(Json(CourseSplitResponse {
        course_id: course.course.id.clone(),
        segment_index,
        passed: passed.to_vec(),
        upcoming: upcoming.to_vec(),
    }))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::geo::PositionFix;
use crate::types::navigation::TurnInstruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress along a course after one accepted fix. Each fix produces a new
/// snapshot; snapshots are never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub passed_distance_meters: f64,
    pub total_distance_meters: f64,
    pub progress_percent: f64,
    pub is_off_course: bool,
    pub nearest_route_index: usize,
    pub lateral_distance_meters: f64,
}

impl ProgressSnapshot {
    pub fn initial(total_distance_meters: f64) -> Self {
        Self {
            passed_distance_meters: 0.0,
            total_distance_meters,
            progress_percent: 0.0,
            is_off_course: false,
            nearest_route_index: 0,
            lateral_distance_meters: 0.0,
        }
    }

    pub fn remaining_distance_meters(&self) -> f64 {
        (self.total_distance_meters - self.passed_distance_meters).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationWarning {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub distance_meters: f64,
}

/// Finalized totals of a stopped session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub distance_meters: f64,
    pub average_pace_seconds_per_km: Option<f64>,
    pub route_samples: Vec<PositionFix>,
}

/// What the persistence collaborator receives once a run completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRun {
    pub run_id: String,
    pub course_id: String,
    pub summary: RunSummary,
    pub final_progress: ProgressSnapshot,
    pub deviation_warnings: Vec<DeviationWarning>,
}

/// Live view of a run for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatus {
    pub state: SessionState,
    pub accumulated_seconds: u64,
    pub total_distance_meters: f64,
    pub pace_seconds_per_km: Option<f64>,
    pub average_speed_kmh: f64,
    /// Remaining course distance at the current average pace.
    pub estimated_remaining_seconds: Option<f64>,
    pub progress: ProgressSnapshot,
    pub next_turn: Option<TurnInstruction>,
    pub last_fix: Option<PositionFix>,
    pub deviation_warnings: usize,
}

use serde::{Deserialize, Serialize};

use crate::types::geo::{BoundingBox, Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnType {
    Straight,
    Left,
    Right,
    UTurn,
}

impl TurnType {
    pub fn icon(&self) -> &'static str {
        match self {
            TurnType::Left => "↰",
            TurnType::Right => "↱",
            TurnType::UTurn => "↶",
            TurnType::Straight => "↑",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavSegment {
    pub points: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub instruction: String,
    pub turn_type: TurnType,
}

impl NavSegment {
    pub fn terminal(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavRoute {
    pub segments: Vec<NavSegment>,
    pub total_distance_meters: f64,
    pub total_duration_seconds: f64,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInstruction {
    pub distance_to_turn_meters: f64,
    pub turn_type: TurnType,
    pub target_coordinate: Coordinate,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationStage {
    pub id: usize,
    pub start: Coordinate,
    pub end: Coordinate,
    pub description: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StageProgress {
    pub completed_stages: usize,
    pub total_stages: usize,
    pub progress_percent: u32,
}

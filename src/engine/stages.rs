use serde::{Deserialize, Serialize};

use crate::engine::waypoints::extract_waypoints;
use crate::types::geo::Coordinate;
use crate::types::navigation::{NavigationStage, StageProgress};

pub const DEFAULT_STAGE_COUNT: usize = 5;

/// Splits the approach to a course into legs between key waypoints. The first
/// leg starts at the runner's current position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiStageNavigation {
    pub stages: Vec<NavigationStage>,
    pub current_stage: usize,
    pub is_completed: bool,
}

impl MultiStageNavigation {
    pub fn plan(current: Coordinate, course_points: &[Coordinate], stage_count: usize) -> Self {
        let key_points = extract_waypoints(course_points, stage_count.max(1) + 1);

        let mut stages = Vec::with_capacity(key_points.len());
        if let Some(first_target) = key_points.get(1).or_else(|| key_points.first()) {
            stages.push(NavigationStage {
                id: 1,
                start: current,
                end: *first_target,
                description: "Stage 1: head to the first waypoint".to_string(),
                is_completed: false,
            });
        }

        for (idx, pair) in key_points.windows(2).enumerate().skip(1) {
            let id = idx + 1;
            stages.push(NavigationStage {
                id,
                start: pair[0],
                end: pair[1],
                description: format!("Stage {}: head to waypoint {}", id, id),
                is_completed: false,
            });
        }

        tracing::debug!(
            "Planned {} navigation stages over {} key waypoints",
            stages.len(),
            key_points.len()
        );

        Self {
            is_completed: stages.is_empty(),
            stages,
            current_stage: 0,
        }
    }

    pub fn total_stages(&self) -> usize {
        self.stages.len()
    }

    pub fn current(&self) -> Option<&NavigationStage> {
        self.stages.get(self.current_stage)
    }

    pub fn proceed(&mut self) {
        if let Some(stage) = self.stages.get_mut(self.current_stage) {
            stage.is_completed = true;
            self.current_stage += 1;
        }
        self.is_completed = self.current_stage >= self.stages.len();
    }

    pub fn progress(&self) -> StageProgress {
        let completed_stages = self.stages.iter().filter(|s| s.is_completed).count();
        let total_stages = self.stages.len();
        let progress_percent = if total_stages > 0 {
            (completed_stages as f64 / total_stages as f64 * 100.0).round() as u32
        } else {
            0
        };
        StageProgress {
            completed_stages,
            total_stages,
            progress_percent,
        }
    }
}

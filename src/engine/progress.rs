use std::sync::Arc;

use uuid::Uuid;

use crate::config::GuidanceConfig;
use crate::engine::route::Route;
use crate::types::geo::{Coordinate, PositionFix};
use crate::types::run::{DeviationWarning, ProgressSnapshot};

const MAX_PATH_POINTS: usize = 1000;
const TRIMMED_PATH_POINTS: usize = 800;

/// Tracks how far along a course the runner has got.
///
/// Passed distance never decreases within a session, so GPS noise or a short
/// backtrack cannot pull the progress bar backwards. The off-course flag is
/// re-evaluated on every fix with no debounce.
#[derive(Debug, Clone)]
pub struct CourseProgressTracker {
    route: Arc<Route>,
    off_course_threshold_meters: f64,
    latest: ProgressSnapshot,
    path: Vec<Coordinate>,
    deviation_warnings: Vec<DeviationWarning>,
}

impl CourseProgressTracker {
    pub fn new(route: Arc<Route>, config: &GuidanceConfig) -> Self {
        let latest = ProgressSnapshot::initial(route.total_distance_meters());
        Self {
            route,
            off_course_threshold_meters: config.off_course_threshold_meters,
            latest,
            path: Vec::new(),
            deviation_warnings: Vec::new(),
        }
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.latest
    }

    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    pub fn deviation_warnings(&self) -> &[DeviationWarning] {
        &self.deviation_warnings
    }

    pub fn update(&mut self, fix: &PositionFix) -> ProgressSnapshot {
        self.path.push(fix.coordinate);
        if self.path.len() > MAX_PATH_POINTS {
            let excess = self.path.len() - TRIMMED_PATH_POINTS;
            self.path.drain(..excess);
        }

        let total = self.route.total_distance_meters();
        if total <= 0.0 {
            self.latest = ProgressSnapshot::initial(total);
            return self.latest;
        }

        let projection = self.route.project_fix(&fix.coordinate);
        let passed = self.latest.passed_distance_meters.max(projection.distance_along_route);
        let is_off_course = projection.lateral_distance_meters >= self.off_course_threshold_meters;

        if is_off_course && !self.latest.is_off_course {
            tracing::info!(
                "Runner left the course: {:.0} m from segment {}",
                projection.lateral_distance_meters,
                projection.segment_index
            );
            self.deviation_warnings.push(DeviationWarning {
                id: Uuid::new_v4().to_string(),
                message: format!(
                    "{:.0} m off the course",
                    projection.lateral_distance_meters
                ),
                timestamp: fix.timestamp,
                distance_meters: projection.lateral_distance_meters,
            });
        }

        self.latest = ProgressSnapshot {
            passed_distance_meters: passed,
            total_distance_meters: total,
            progress_percent: (100.0 * passed / total).clamp(0.0, 100.0),
            is_off_course,
            nearest_route_index: projection.segment_index,
            lateral_distance_meters: projection.lateral_distance_meters,
        };
        self.latest
    }
}

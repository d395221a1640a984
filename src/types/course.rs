use serde::{Deserialize, Serialize};

use crate::types::geo::Coordinate;

/// Course as handed over by the course-data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub area: String,
    pub waypoints: Vec<Coordinate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteInfo {
    pub total_distance_meters: f64,
    pub estimated_duration_minutes: f64,
    pub waypoint_count: usize,
}

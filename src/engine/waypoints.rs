use crate::engine::geo::{bearing_degrees, bearing_delta, distance_meters, path_length_meters};
use crate::types::course::RouteInfo;
use crate::types::geo::Coordinate;

const ESTIMATE_SPEED_KMH: f64 = 15.0;
const FULL_WEIGHT_DISTANCE_M: f64 = 100.0;

/// Evenly spaced key points. The first and last point are always kept and the
/// result never exceeds `max_waypoints` (minimum 2).
pub fn extract_waypoints(points: &[Coordinate], max_waypoints: usize) -> Vec<Coordinate> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let max_waypoints = max_waypoints.max(2);
    let last = points.len() - 1;
    let interval = (points.len() / (max_waypoints - 1).max(1)).max(1);

    let mut waypoints = vec![points[0]];
    waypoints.extend(
        (interval..last)
            .step_by(interval)
            .take(max_waypoints - 2)
            .map(|idx| points[idx]),
    );
    waypoints.push(points[last]);
    waypoints
}

/// Key points ranked by how sharply the route turns there, weighted down when
/// a neighbour is closer than 100 m.
pub fn optimize_waypoints(points: &[Coordinate], max_waypoints: usize) -> Vec<Coordinate> {
    let max_waypoints = max_waypoints.max(2);
    if points.len() <= max_waypoints {
        return points.to_vec();
    }

    let mut scored: Vec<(usize, f64)> = points
        .windows(3)
        .enumerate()
        .map(|(offset, window)| {
            let (prev, current, next) = (&window[0], &window[1], &window[2]);
            let turn = bearing_delta(bearing_degrees(prev, current), bearing_degrees(current, next)).to_radians();
            let shortest = distance_meters(prev, current).min(distance_meters(current, next));
            let weight = (shortest / FULL_WEIGHT_DISTANCE_M).min(1.0);
            (offset + 1, turn * weight)
        })
        .collect();

    // Stable sort keeps earlier points ahead on equal scores.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut selected: Vec<usize> = scored
        .into_iter()
        .take(max_waypoints - 2)
        .map(|(idx, _)| idx)
        .collect();
    selected.sort_unstable();

    let mut waypoints = Vec::with_capacity(max_waypoints);
    waypoints.push(points[0]);
    waypoints.extend(selected.into_iter().map(|idx| points[idx]));
    waypoints.push(points[points.len() - 1]);
    waypoints
}

pub fn route_info(points: &[Coordinate]) -> RouteInfo {
    let total = path_length_meters(points);
    RouteInfo {
        total_distance_meters: total.round(),
        estimated_duration_minutes: ((total / 1000.0) / ESTIMATE_SPEED_KMH * 60.0).round(),
        waypoint_count: points.len(),
    }
}

use crate::engine::geo::distance_meters;
use crate::types::geo::{BoundingBox, Coordinate};
use crate::types::navigation::{NavRoute, NavSegment, TurnInstruction, TurnType};

/// Source of point-to-point routes for pre-run guidance.
pub trait RouteProvider: Send + Sync {
    fn build_route(&self, origin: Coordinate, destination: Coordinate, waypoints: &[Coordinate]) -> NavRoute;
}

/// Placeholder router that joins the points with straight lines.
///
/// It knows nothing about the street network: distances are great-circle
/// distances, durations assume a constant speed, and every segment is
/// classified as [`TurnType::Straight`].
#[derive(Debug, Clone, Copy)]
pub struct StraightLineRouter {
    pub assumed_speed_kmh: f64,
}

impl StraightLineRouter {
    pub fn new(assumed_speed_kmh: f64) -> Self {
        Self { assumed_speed_kmh }
    }
}

impl RouteProvider for StraightLineRouter {
    fn build_route(&self, origin: Coordinate, destination: Coordinate, waypoints: &[Coordinate]) -> NavRoute {
        let mut all_points = Vec::with_capacity(waypoints.len() + 2);
        all_points.push(origin);
        all_points.extend_from_slice(waypoints);
        all_points.push(destination);

        let meters_per_second = self.assumed_speed_kmh / 3.6;

        let segments: Vec<NavSegment> = all_points
            .windows(2)
            .enumerate()
            .map(|(idx, pair)| {
                let distance = distance_meters(&pair[0], &pair[1]);
                let duration = if meters_per_second > 0.0 {
                    distance / meters_per_second
                } else {
                    0.0
                };
                let instruction = if idx == 0 {
                    "Head straight toward the destination".to_string()
                } else {
                    format!("Continue straight for {} m", distance.round())
                };
                NavSegment {
                    points: vec![pair[0], pair[1]],
                    distance_meters: distance,
                    duration_seconds: duration,
                    instruction,
                    turn_type: TurnType::Straight,
                }
            })
            .collect();

        NavRoute {
            total_distance_meters: segments.iter().map(|s| s.distance_meters).sum(),
            total_duration_seconds: segments.iter().map(|s| s.duration_seconds).sum(),
            bounding_box: BoundingBox::from_points(&all_points),
            segments,
        }
    }
}

pub struct NavigationGuide<R = StraightLineRouter> {
    router: R,
}

impl NavigationGuide<StraightLineRouter> {
    pub fn straight_line(assumed_speed_kmh: f64) -> Self {
        Self::new(StraightLineRouter::new(assumed_speed_kmh))
    }
}

impl<R: RouteProvider> NavigationGuide<R> {
    pub fn new(router: R) -> Self {
        Self { router }
    }

    pub fn build_route(&self, origin: Coordinate, destination: Coordinate, waypoints: &[Coordinate]) -> NavRoute {
        self.router.build_route(origin, destination, waypoints)
    }

    /// Instruction for the segment holding the route point closest to
    /// `current`. Returns `None` for a route without segments.
    pub fn next_turn_instruction(&self, route: &NavRoute, current: &Coordinate) -> Option<TurnInstruction> {
        let mut nearest: Option<(&NavSegment, f64)> = None;

        for segment in &route.segments {
            for point in &segment.points {
                let distance = distance_meters(current, point);
                if nearest.map(|(_, best)| distance < best).unwrap_or(true) {
                    nearest = Some((segment, distance));
                }
            }
        }

        let (segment, _) = nearest?;
        let target = segment.terminal()?;

        Some(TurnInstruction {
            distance_to_turn_meters: distance_meters(current, &target).round(),
            turn_type: segment.turn_type,
            target_coordinate: target,
            text: segment.instruction.clone(),
        })
    }
}

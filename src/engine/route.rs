use serde::{Deserialize, Serialize};

use crate::engine::geo::{distance_meters, nearest_point_on_segment};
use crate::error::RouteError;
use crate::types::geo::Coordinate;

/// Immutable course polyline with a cumulative-distance index.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    points: Vec<Coordinate>,
    cumulative_distance_meters: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteProjection {
    pub segment_index: usize,
    pub distance_along_route: f64,
    pub lateral_distance_meters: f64,
    pub point: Coordinate,
}

impl Route {
    pub fn new(points: Vec<Coordinate>) -> Result<Self, RouteError> {
        Self::with_min_segment(points, 0.0)
    }

    /// Builds a route, rejecting consecutive points closer than `min_segment_meters`.
    pub fn with_min_segment(points: Vec<Coordinate>, min_segment_meters: f64) -> Result<Self, RouteError> {
        if points.len() < 2 {
            return Err(RouteError::TooFewPoints(points.len()));
        }

        if let Some((index, point)) = points.iter().enumerate().find(|(_, p)| !p.is_valid()) {
            return Err(RouteError::CoordinateOutOfRange {
                index,
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }

        let mut cumulative_distance_meters = Vec::with_capacity(points.len());
        cumulative_distance_meters.push(0.0);
        let mut total = 0.0;
        for (index, pair) in points.windows(2).enumerate() {
            let segment = distance_meters(&pair[0], &pair[1]);
            if segment < min_segment_meters {
                return Err(RouteError::CoincidentPoints {
                    index,
                    distance: segment,
                });
            }
            total += segment;
            cumulative_distance_meters.push(total);
        }

        Ok(Self {
            points,
            cumulative_distance_meters,
        })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn cumulative_distance_meters(&self) -> &[f64] {
        &self.cumulative_distance_meters
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.cumulative_distance_meters.last().copied().unwrap_or(0.0)
    }

    pub fn start(&self) -> Coordinate {
        self.points[0]
    }

    pub fn end(&self) -> Coordinate {
        self.points[self.points.len() - 1]
    }

    /// Splits the polyline at `segment_index` into the part already run and
    /// the part still ahead. Both halves share the segment's start point.
    pub fn split_at_segment(&self, segment_index: usize) -> (&[Coordinate], &[Coordinate]) {
        let index = segment_index.min(self.points.len() - 1);
        (&self.points[..=index], &self.points[index..])
    }

    /// Snaps `p` to the closest segment. Ties keep the earliest segment so a
    /// route that loops back on itself does not jump ahead.
    pub fn project_fix(&self, p: &Coordinate) -> RouteProjection {
        let mut best: Option<RouteProjection> = None;

        for (segment_index, pair) in self.points.windows(2).enumerate() {
            let projection = nearest_point_on_segment(p, &pair[0], &pair[1]);
            let closer = best
                .map(|b| projection.distance_from_segment < b.lateral_distance_meters)
                .unwrap_or(true);
            if closer {
                best = Some(RouteProjection {
                    segment_index,
                    distance_along_route: self.cumulative_distance_meters[segment_index]
                        + projection.distance_along_segment,
                    lateral_distance_meters: projection.distance_from_segment,
                    point: projection.point,
                });
            }
        }

        // A route always has at least one segment.
        best.unwrap_or(RouteProjection {
            segment_index: 0,
            distance_along_route: 0.0,
            lateral_distance_meters: distance_meters(p, &self.points[0]),
            point: self.points[0],
        })
    }
}

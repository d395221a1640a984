use serde::{Deserialize, Serialize};

use crate::types::geo::Coordinate;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h past 1 for near-antipodal points.
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from `a` to `b`, in degrees clockwise from north.
pub fn bearing_degrees(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round a tiny negative angle up to exactly 360.
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Absolute change of heading between two bearings, in degrees (0..=180).
pub fn bearing_delta(from: f64, to: f64) -> f64 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        360.0 - delta
    } else {
        delta
    }
}

/// Signed change of heading in degrees, in [-180, 180). Positive turns right.
pub fn signed_bearing_delta(from: f64, to: f64) -> f64 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentProjection {
    pub point: Coordinate,
    pub distance_along_segment: f64,
    pub distance_from_segment: f64,
}

/// Projects `p` onto the segment `start`-`end` on a local equirectangular plane
/// centred at the segment's mean latitude. The result is clamped to the segment.
pub fn nearest_point_on_segment(p: &Coordinate, start: &Coordinate, end: &Coordinate) -> SegmentProjection {
    let ref_lat = ((start.latitude + end.latitude) / 2.0).to_radians();
    let to_plane = |c: &Coordinate| -> (f64, f64) {
        let x = (c.longitude - start.longitude).to_radians() * ref_lat.cos() * EARTH_RADIUS_M;
        let y = (c.latitude - start.latitude).to_radians() * EARTH_RADIUS_M;
        (x, y)
    };

    let (ex, ey) = to_plane(end);
    let (px, py) = to_plane(p);

    let len_sq = ex * ex + ey * ey;
    let t = if len_sq > 0.0 {
        ((px * ex + py * ey) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let (qx, qy) = (t * ex, t * ey);
    let point = Coordinate {
        latitude: start.latitude + t * (end.latitude - start.latitude),
        longitude: start.longitude + t * (end.longitude - start.longitude),
    };

    SegmentProjection {
        point,
        // Haversine-scaled: t = 1 lands on the cumulative index of `end`.
        distance_along_segment: t * distance_meters(start, end),
        distance_from_segment: (px - qx).hypot(py - qy),
    }
}

pub fn path_length_meters(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_meters(&pair[0], &pair[1]))
        .sum()
}

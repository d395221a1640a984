#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use runguide_rs::engine::geo::EARTH_RADIUS_M;
use runguide_rs::types::geo::{Coordinate, PositionFix};

pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 7, 0, 0).unwrap()
}

pub fn fix_at(coordinate: Coordinate, seconds: i64) -> PositionFix {
    PositionFix::new(coordinate, 5.0, base_time() + Duration::seconds(seconds))
}

pub fn fix_with_accuracy(coordinate: Coordinate, accuracy_meters: f64, seconds: i64) -> PositionFix {
    PositionFix::new(coordinate, accuracy_meters, base_time() + Duration::seconds(seconds))
}

/// Moves `origin` the given number of metres north (negative = south).
pub fn north_of(origin: Coordinate, meters: f64) -> Coordinate {
    Coordinate::new(
        origin.latitude + (meters / EARTH_RADIUS_M).to_degrees(),
        origin.longitude,
    )
}

/// Moves `origin` the given number of metres east at its own latitude.
pub fn east_of(origin: Coordinate, meters: f64) -> Coordinate {
    let scale = origin.latitude.to_radians().cos() * EARTH_RADIUS_M;
    Coordinate::new(origin.latitude, origin.longitude + (meters / scale).to_degrees())
}

pub fn seoul_city_hall() -> Coordinate {
    Coordinate::new(37.5665, 126.9780)
}

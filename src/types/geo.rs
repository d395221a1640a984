use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A single device position reading. Produced by a location source and never
/// persisted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    pub accuracy_meters: f64,
    #[serde(default)]
    pub speed_mps: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    pub fn new(coordinate: Coordinate, accuracy_meters: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            accuracy_meters,
            speed_mps: None,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl BoundingBox {
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        let first = points.first()?;
        let mut south_west = *first;
        let mut north_east = *first;
        for point in &points[1..] {
            south_west.latitude = south_west.latitude.min(point.latitude);
            south_west.longitude = south_west.longitude.min(point.longitude);
            north_east.latitude = north_east.latitude.max(point.latitude);
            north_east.longitude = north_east.longitude.max(point.longitude);
        }
        Some(Self {
            south_west,
            north_east,
        })
    }
}

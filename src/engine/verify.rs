use serde::{Deserialize, Serialize};

use crate::engine::geo::{distance_meters, path_length_meters};
use crate::engine::route::Route;
use crate::types::geo::{Coordinate, PositionFix};
use crate::types::run::RunSummary;

const LOW_ACCURACY_M: f64 = 50.0;
const SIGNAL_GAP_SECONDS: i64 = 60;
const MIN_STRAIGHT_LINE_M: f64 = 100.0;
const MIN_RUN_DISTANCE_M: f64 = 500.0;
const ENDPOINT_TOLERANCE_M: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    AutoApprove,
    ManualReview,
    ScreenshotRequired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationMetrics {
    pub data_quality: f64,
    pub route_consistency: f64,
    pub speed_profile: f64,
    pub duration: f64,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_valid: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
    pub metrics: VerificationMetrics,
    pub recommendation: Recommendation,
}

struct Assessment {
    score: f64,
    issues: Vec<String>,
}

impl Assessment {
    fn new() -> Self {
        Self {
            score: 1.0,
            issues: Vec::new(),
        }
    }

    fn failed(issue: &str) -> Self {
        Self {
            score: 0.0,
            issues: vec![issue.to_string()],
        }
    }

    fn penalize(&mut self, factor: f64, issue: &str) {
        self.score *= factor;
        self.issues.push(issue.to_string());
    }
}

/// Scores how plausible a completed run is as a genuine run of the course.
pub fn verify_run(summary: &RunSummary, course: Option<&Route>) -> VerificationResult {
    let samples = &summary.route_samples;

    let data_quality = assess_data_quality(samples);
    let speed_profile = assess_speed_profile(samples);
    let route_consistency = assess_route_consistency(samples, course);
    let duration = assess_duration(summary.duration_seconds);

    let confidence = data_quality.score * 0.3
        + speed_profile.score * 0.25
        + route_consistency.score * 0.3
        + duration.score * 0.15;

    let metrics = VerificationMetrics {
        data_quality: data_quality.score,
        route_consistency: route_consistency.score,
        speed_profile: speed_profile.score,
        duration: duration.score,
        distance_km: path_length_meters(&coordinates(samples)) / 1000.0,
    };

    let issues: Vec<String> = [data_quality, speed_profile, route_consistency, duration]
        .into_iter()
        .flat_map(|a| a.issues)
        .collect();

    let recommendation = if confidence >= 0.8 && issues.len() <= 1 {
        Recommendation::AutoApprove
    } else if confidence >= 0.6 && issues.len() <= 3 {
        Recommendation::ManualReview
    } else {
        Recommendation::ScreenshotRequired
    };

    VerificationResult {
        is_valid: confidence >= 0.6,
        confidence,
        issues,
        metrics,
        recommendation,
    }
}

fn coordinates(samples: &[PositionFix]) -> Vec<Coordinate> {
    samples.iter().map(|s| s.coordinate).collect()
}

fn assess_data_quality(samples: &[PositionFix]) -> Assessment {
    let mut result = Assessment::new();
    if samples.is_empty() {
        return Assessment::failed("No GPS samples recorded");
    }

    if samples.len() < 10 {
        result.penalize(0.3, "Not enough GPS samples (at least 10 required)");
    } else if samples.len() < 30 {
        result.penalize(0.7, "Few GPS samples");
    }

    let inaccurate = samples.iter().filter(|s| s.accuracy_meters > LOW_ACCURACY_M).count();
    let inaccurate_ratio = inaccurate as f64 / samples.len() as f64;
    if inaccurate_ratio > 0.5 {
        result.penalize(0.6, "GPS accuracy is poor");
    } else if inaccurate_ratio > 0.3 {
        result.penalize(0.8, "Some GPS samples have poor accuracy");
    }

    let gaps = samples
        .windows(2)
        .filter(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() > SIGNAL_GAP_SECONDS)
        .count();
    if gaps as f64 > samples.len() as f64 * 0.2 {
        result.penalize(0.7, "GPS signal dropped out frequently");
    }

    result
}

fn assess_speed_profile(samples: &[PositionFix]) -> Assessment {
    if samples.len() < 2 {
        return Assessment::failed("Not enough data to compute speed");
    }

    let speeds: Vec<f64> = samples
        .windows(2)
        .filter_map(|pair| {
            let seconds = (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64 / 1000.0;
            (seconds > 0.0)
                .then(|| distance_meters(&pair[0].coordinate, &pair[1].coordinate) / seconds * 3.6)
        })
        .collect();

    if speeds.is_empty() {
        return Assessment::failed("Speed could not be computed");
    }

    let mut result = Assessment::new();
    let avg_speed = speeds.iter().sum::<f64>() / speeds.len() as f64;
    let max_speed = speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if avg_speed < 3.0 {
        result.penalize(0.6, "Average speed is too low (walking pace)");
    } else if avg_speed > 50.0 {
        result.penalize(0.3, "Average speed is too high (vehicle suspected)");
    }

    if max_speed > 80.0 {
        result.penalize(0.4, "Top speed is unrealistic");
    }

    if speeds.len() > 1 {
        let variation = speeds.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>() / (speeds.len() - 1) as f64;
        if variation > 20.0 {
            result.penalize(0.7, "Speed changes are erratic");
        }
    }

    result
}

fn assess_route_consistency(samples: &[PositionFix], course: Option<&Route>) -> Assessment {
    if samples.len() < 2 {
        return Assessment::failed("Not enough data to analyse the route");
    }

    let mut result = Assessment::new();
    let path = coordinates(samples);
    let total = path_length_meters(&path);
    let start = path[0];
    let end = path[path.len() - 1];

    let straight = distance_meters(&start, &end).max(MIN_STRAIGHT_LINE_M);
    if total / straight > 10.0 {
        result.penalize(0.7, "Path is unusually indirect");
    }

    if total < MIN_RUN_DISTANCE_M {
        result.penalize(0.5, "Distance covered is too short");
    }

    if let Some(route) = course {
        if distance_meters(&start, &route.start()) > ENDPOINT_TOLERANCE_M {
            result.penalize(0.8, "Run did not start at the course start");
        }
        if distance_meters(&end, &route.end()) > ENDPOINT_TOLERANCE_M {
            result.penalize(0.8, "Run did not finish at the course end");
        }
    }

    result
}

fn assess_duration(duration_seconds: u64) -> Assessment {
    let mut result = Assessment::new();
    let minutes = duration_seconds as f64 / 60.0;

    if minutes < 2.0 {
        result.penalize(0.4, "Run is too short");
    } else if minutes < 5.0 {
        result.penalize(0.7, "Run is short");
    }

    if minutes > 480.0 {
        result.penalize(0.5, "Run is unrealistically long");
    }

    result
}

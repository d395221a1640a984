use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_body_size: usize,
    pub session_ttl: Duration,
    pub guidance: GuidanceConfig,
}

/// Tuning knobs for the guidance engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidanceConfig {
    /// Lateral distance at or beyond which a fix counts as off-course.
    pub off_course_threshold_meters: f64,
    /// Fixes reporting a worse accuracy than this are dropped.
    pub min_acceptable_accuracy_meters: f64,
    /// Speed used by the straight-line router to estimate durations.
    pub assumed_walking_speed_kmh: f64,
    /// Consecutive route points closer than this are rejected. 0 allows duplicates.
    pub min_segment_meters: f64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            off_course_threshold_meters: 50.0,
            min_acceptable_accuracy_meters: 30.0,
            assumed_walking_speed_kmh: 50.0,
            min_segment_meters: 0.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            max_body_size: 512 * 1024,
            session_ttl: Duration::from_secs(6 * 3600),
            guidance: GuidanceConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let guidance = defaults.guidance;

        let port = env_or("PORT", defaults.port);
        let max_body_size_kb: usize = env_or("MAX_BODY_SIZE_KB", defaults.max_body_size / 1024);
        let session_ttl_seconds = env_or("SESSION_TTL_SECONDS", defaults.session_ttl.as_secs());

        Self {
            port,
            max_body_size: max_body_size_kb * 1024,
            session_ttl: Duration::from_secs(session_ttl_seconds),
            guidance: GuidanceConfig {
                off_course_threshold_meters: env_or(
                    "OFF_COURSE_THRESHOLD_M",
                    guidance.off_course_threshold_meters,
                ),
                min_acceptable_accuracy_meters: env_or(
                    "MIN_ACCURACY_M",
                    guidance.min_acceptable_accuracy_meters,
                ),
                assumed_walking_speed_kmh: env_or(
                    "ASSUMED_SPEED_KMH",
                    guidance.assumed_walking_speed_kmh,
                ),
                min_segment_meters: env_or("MIN_SEGMENT_M", guidance.min_segment_meters),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

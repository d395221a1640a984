use chrono::{DateTime, Utc};

use crate::config::GuidanceConfig;
use crate::engine::geo::distance_meters;
use crate::error::SessionError;
use crate::types::geo::PositionFix;
use crate::types::run::{RunSummary, SessionState};

const MAX_ROUTE_SAMPLES: usize = 1000;
const TRIMMED_ROUTE_SAMPLES: usize = 800;

/// State of a single run: lifecycle, active duration and distance covered.
///
/// Only fixes accepted while running count towards distance, and duration only
/// advances through [`TrackingSession::tick`] while running.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    accumulated_seconds: u64,
    total_distance_meters: f64,
    last_fix: Option<PositionFix>,
    route_samples: Vec<PositionFix>,
    max_accuracy_meters: f64,
}

impl TrackingSession {
    pub fn new(config: &GuidanceConfig) -> Self {
        Self {
            state: SessionState::Idle,
            started_at: None,
            accumulated_seconds: 0,
            total_distance_meters: 0.0,
            last_fix: None,
            route_samples: Vec::new(),
            max_accuracy_meters: config.min_acceptable_accuracy_meters,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn accumulated_seconds(&self) -> u64 {
        self.accumulated_seconds
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance_meters
    }

    pub fn last_fix(&self) -> Option<&PositionFix> {
        self.last_fix.as_ref()
    }

    pub fn route_samples(&self) -> &[PositionFix] {
        &self.route_samples
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.transition("start", &[SessionState::Idle], SessionState::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.transition("pause", &[SessionState::Running], SessionState::Paused)
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.transition("resume", &[SessionState::Paused], SessionState::Running)
    }

    pub fn stop(&mut self) -> Result<RunSummary, SessionError> {
        self.transition(
            "stop",
            &[SessionState::Running, SessionState::Paused],
            SessionState::Completed,
        )?;

        Ok(RunSummary {
            started_at: self.started_at,
            completed_at: Utc::now(),
            duration_seconds: self.accumulated_seconds,
            distance_meters: self.total_distance_meters,
            average_pace_seconds_per_km: self.pace_seconds_per_km(),
            route_samples: self.route_samples.clone(),
        })
    }

    fn transition(
        &mut self,
        action: &'static str,
        allowed: &[SessionState],
        next: SessionState,
    ) -> Result<(), SessionError> {
        if !allowed.contains(&self.state) {
            return Err(SessionError::InvalidTransition {
                action,
                from: self.state,
            });
        }
        tracing::debug!("Session {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Advances the active duration by one second. Ignored unless running.
    pub fn tick(&mut self) {
        if self.state == SessionState::Running {
            self.accumulated_seconds += 1;
        }
    }

    /// Returns whether the fix was accepted. Low-accuracy, duplicate and
    /// out-of-order fixes are dropped without touching distance or pace.
    pub fn accept_fix(&mut self, fix: &PositionFix) -> bool {
        if self.state != SessionState::Running {
            return false;
        }

        if !fix.accuracy_meters.is_finite() || fix.accuracy_meters > self.max_accuracy_meters {
            tracing::debug!(
                "Dropping fix with accuracy {:.1} m (limit {:.1} m)",
                fix.accuracy_meters,
                self.max_accuracy_meters
            );
            return false;
        }

        if let Some(last) = &self.last_fix {
            let duplicate = fix.timestamp == last.timestamp && fix.coordinate == last.coordinate;
            if duplicate || fix.timestamp < last.timestamp {
                tracing::debug!("Dropping duplicate or stale fix at {}", fix.timestamp);
                return false;
            }
            self.total_distance_meters += distance_meters(&last.coordinate, &fix.coordinate);
        }

        self.last_fix = Some(*fix);
        self.route_samples.push(*fix);
        if self.route_samples.len() > MAX_ROUTE_SAMPLES {
            let excess = self.route_samples.len() - TRIMMED_ROUTE_SAMPLES;
            self.route_samples.drain(..excess);
        }
        true
    }

    /// Seconds per kilometre, or `None` before any distance is covered.
    pub fn pace_seconds_per_km(&self) -> Option<f64> {
        if self.total_distance_meters <= 0.0 {
            return None;
        }
        Some(self.accumulated_seconds as f64 / (self.total_distance_meters / 1000.0))
    }

    pub fn average_speed_kmh(&self) -> f64 {
        if self.accumulated_seconds == 0 {
            return 0.0;
        }
        (self.total_distance_meters / 1000.0) / (self.accumulated_seconds as f64) * 3600.0
    }
}

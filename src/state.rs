use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::Config;
use crate::engine::route::Route;
use crate::live::{BroadcastSource, LiveRun, RunRecorder};
use crate::types::course::CourseData;
use crate::types::run::{CompletedRun, SessionState};

/// Course-data collaborator used to build routes.
pub trait CourseProvider: Send + Sync {
    fn course(&self, id: &str) -> Option<CourseData>;
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    courses: Arc<DashMap<String, StoredCourse>>,
    runs: Arc<DashMap<String, ActiveRun>>,
    completed: Arc<DashMap<String, StoredRun>>,
}

#[derive(Clone)]
pub struct StoredCourse {
    pub course: CourseData,
    pub route: Arc<Route>,
}

/// A live run together with the feed its fixes are published on.
#[derive(Clone)]
pub struct ActiveRun {
    pub run: Arc<LiveRun>,
    pub source: BroadcastSource,
    created_at: Instant,
}

impl ActiveRun {
    pub fn is_in_progress(&self) -> bool {
        !self.run.is_finished()
            && matches!(
                self.run.latest_status().state,
                SessionState::Running | SessionState::Paused
            )
    }
}

struct StoredRun {
    run: CompletedRun,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            courses: Arc::new(DashMap::new()),
            runs: Arc::new(DashMap::new()),
            completed: Arc::new(DashMap::new()),
        }
    }

    pub fn insert_course(&self, course: CourseData, route: Route) -> StoredCourse {
        let stored = StoredCourse {
            course,
            route: Arc::new(route),
        };
        self.courses.insert(stored.course.id.clone(), stored.clone());
        stored
    }

    pub fn get_course(&self, id: &str) -> Option<StoredCourse> {
        self.courses.get(id).map(|entry| entry.clone())
    }

    pub fn insert_run(&self, run: LiveRun, source: BroadcastSource) -> ActiveRun {
        let active = ActiveRun {
            run: Arc::new(run),
            source,
            created_at: Instant::now(),
        };
        self.runs.insert(active.run.id().to_string(), active.clone());
        active
    }

    pub fn get_run(&self, id: &str) -> Option<ActiveRun> {
        self.runs.get(id).map(|entry| entry.clone())
    }

    pub fn get_completed(&self, id: &str) -> Option<CompletedRun> {
        self.completed.get(id).map(|entry| entry.run.clone())
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn active_run_count(&self) -> usize {
        self.runs.iter().filter(|entry| !entry.run.is_finished()).count()
    }

    /// Drops idle or finished runs and completed records older than `ttl`.
    /// Dropping the last handle to a live run aborts its task.
    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        // Running and paused runs are kept until stopped.
        self.runs.retain(|_, active| {
            now.duration_since(active.created_at) < ttl || active.is_in_progress()
        });
        self.completed
            .retain(|_, stored| now.duration_since(stored.inserted_at) < ttl);
        tracing::info!(
            "Run eviction complete. Active: {}, completed: {}",
            self.runs.len(),
            self.completed.len()
        );
    }
}

impl CourseProvider for AppState {
    fn course(&self, id: &str) -> Option<CourseData> {
        self.courses.get(id).map(|entry| entry.course.clone())
    }
}

impl RunRecorder for AppState {
    fn record(&self, run: CompletedRun) {
        self.completed.insert(
            run.run_id.clone(),
            StoredRun {
                run,
                inserted_at: Instant::now(),
            },
        );
    }
}

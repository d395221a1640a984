use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use crate::config::GuidanceConfig;
use crate::engine::progress::CourseProgressTracker;
use crate::engine::route::Route;
use crate::engine::session::TrackingSession;
use crate::engine::turns::next_course_turn;
use crate::error::SessionError;
use crate::live::source::{PositionSource, Subscription};
use crate::types::geo::PositionFix;
use crate::types::run::{CompletedRun, RunStatus, SessionState};

const TICK: Duration = Duration::from_secs(1);

/// Persistence collaborator for finished runs.
pub trait RunRecorder: Send + Sync {
    fn record(&self, run: CompletedRun);
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum Control {
    Start(Reply<RunStatus>),
    Pause(Reply<RunStatus>),
    Resume(Reply<RunStatus>),
    Stop(Reply<CompletedRun>),
    Status(Reply<RunStatus>),
}

// Fixes and controls share one channel so they are handled in arrival order.
enum Event {
    Fix(PositionFix),
    Control(Control),
}

/// Handle to a running session task.
///
/// The task exclusively owns the [`TrackingSession`] and
/// [`CourseProgressTracker`] of one run. Fixes from the position source and
/// control calls are processed one at a time, and the 1 Hz duration tick only
/// fires while the session is running. Dropping the handle aborts the task.
pub struct LiveRun {
    id: String,
    course_id: String,
    events: mpsc::UnboundedSender<Event>,
    status: watch::Receiver<RunStatus>,
    task: JoinHandle<()>,
}

impl LiveRun {
    pub fn spawn(
        id: String,
        course_id: String,
        route: Arc<Route>,
        config: &GuidanceConfig,
        source: &dyn PositionSource,
        recorder: Arc<dyn RunRecorder>,
    ) -> Self {
        let session = TrackingSession::new(config);
        let tracker = CourseProgressTracker::new(route, config);

        let (events, receiver) = mpsc::unbounded_channel();
        let fixes = events.clone();
        let subscription = source.subscribe(Box::new(move |fix| {
            // The task is gone once the run has stopped; late fixes are dropped.
            let _ = fixes.send(Event::Fix(fix));
        }));

        let (status_tx, status) = watch::channel(status_of(&session, &tracker));

        let worker = Worker {
            run_id: id.clone(),
            course_id: course_id.clone(),
            session,
            tracker,
            subscription: Some(subscription),
            status: status_tx,
            recorder,
        };
        let task = tokio::spawn(worker.run(receiver));

        tracing::info!("Run {} created for course {}", id, course_id);

        Self {
            id,
            course_id,
            events,
            status,
            task,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub async fn start(&self) -> Result<RunStatus, SessionError> {
        self.request(Control::Start).await?
    }

    pub async fn pause(&self) -> Result<RunStatus, SessionError> {
        self.request(Control::Pause).await?
    }

    pub async fn resume(&self) -> Result<RunStatus, SessionError> {
        self.request(Control::Resume).await?
    }

    /// Completes the run. When this returns the fix subscription and the tick
    /// timer are already stopped.
    pub async fn stop(&self) -> Result<CompletedRun, SessionError> {
        self.request(Control::Stop).await?
    }

    /// Status after every event queued before this call has been handled.
    pub async fn status(&self) -> RunStatus {
        match self.request(Control::Status).await {
            Ok(Ok(status)) => status,
            _ => self.latest_status(),
        }
    }

    pub fn latest_status(&self) -> RunStatus {
        self.status.borrow().clone()
    }

    /// Stream of status updates, one per accepted fix, tick or transition.
    pub fn watch_status(&self) -> watch::Receiver<RunStatus> {
        self.status.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    async fn request<T>(
        &self,
        control: impl FnOnce(Reply<T>) -> Control,
    ) -> Result<Result<T, SessionError>, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.events
            .send(Event::Control(control(tx)))
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

impl Drop for LiveRun {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Worker {
    run_id: String,
    course_id: String,
    session: TrackingSession,
    tracker: CourseProgressTracker,
    subscription: Option<Subscription>,
    status: watch::Sender<RunStatus>,
    recorder: Arc<dyn RunRecorder>,
}

impl Worker {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let running = self.session.state() == SessionState::Running;
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    let finished = match event {
                        Event::Fix(fix) => {
                            self.handle_fix(fix);
                            false
                        }
                        Event::Control(control) => self.handle_control(control, &mut ticker),
                    };
                    if finished {
                        break;
                    }
                }
                _ = ticker.tick(), if running => {
                    self.session.tick();
                    self.publish();
                }
            }
        }

        tracing::debug!("Run {} task finished", self.run_id);
    }

    fn handle_fix(&mut self, fix: PositionFix) {
        if !self.session.accept_fix(&fix) {
            return;
        }
        let snapshot = self.tracker.update(&fix);
        tracing::debug!(
            "Run {}: {:.0}/{:.0} m ({:.1}%), lateral {:.1} m",
            self.run_id,
            snapshot.passed_distance_meters,
            snapshot.total_distance_meters,
            snapshot.progress_percent,
            snapshot.lateral_distance_meters
        );
        self.publish();
    }

    /// Returns true once the run has completed and the loop must exit.
    fn handle_control(&mut self, control: Control, ticker: &mut Interval) -> bool {
        match control {
            Control::Start(reply) => {
                let result = self.session.start().map(|_| {
                    ticker.reset();
                    tracing::info!("Run {} started", self.run_id);
                    self.publish()
                });
                let _ = reply.send(result);
            }
            Control::Pause(reply) => {
                let result = self.session.pause().map(|_| {
                    tracing::info!(
                        "Run {} paused at {} s",
                        self.run_id,
                        self.session.accumulated_seconds()
                    );
                    self.publish()
                });
                let _ = reply.send(result);
            }
            Control::Resume(reply) => {
                let result = self.session.resume().map(|_| {
                    ticker.reset();
                    tracing::info!("Run {} resumed", self.run_id);
                    self.publish()
                });
                let _ = reply.send(result);
            }
            Control::Status(reply) => {
                let _ = reply.send(Ok(status_of(&self.session, &self.tracker)));
            }
            Control::Stop(reply) => match self.session.stop() {
                Ok(summary) => {
                    if let Some(subscription) = self.subscription.take() {
                        subscription.unsubscribe();
                    }
                    let completed = CompletedRun {
                        run_id: self.run_id.clone(),
                        course_id: self.course_id.clone(),
                        summary,
                        final_progress: self.tracker.snapshot(),
                        deviation_warnings: self.tracker.deviation_warnings().to_vec(),
                    };
                    tracing::info!(
                        "Run {} completed: {} s, {:.0} m, {:.1}% of course",
                        self.run_id,
                        completed.summary.duration_seconds,
                        completed.summary.distance_meters,
                        completed.final_progress.progress_percent
                    );
                    self.recorder.record(completed.clone());
                    self.publish();
                    let _ = reply.send(Ok(completed));
                    return true;
                }
                Err(err) => {
                    tracing::warn!("Run {}: {}", self.run_id, err);
                    let _ = reply.send(Err(err));
                }
            },
        }
        false
    }

    fn publish(&self) -> RunStatus {
        let status = status_of(&self.session, &self.tracker);
        self.status.send_replace(status.clone());
        status
    }
}

fn status_of(session: &TrackingSession, tracker: &CourseProgressTracker) -> RunStatus {
    let progress = tracker.snapshot();
    let pace = session.pace_seconds_per_km();
    RunStatus {
        state: session.state(),
        accumulated_seconds: session.accumulated_seconds(),
        total_distance_meters: session.total_distance_meters(),
        pace_seconds_per_km: pace,
        average_speed_kmh: session.average_speed_kmh(),
        estimated_remaining_seconds: pace.map(|pace| progress.remaining_distance_meters() / 1000.0 * pace),
        next_turn: next_course_turn(
            tracker.route(),
            progress.nearest_route_index,
            progress.passed_distance_meters,
        ),
        progress,
        last_fix: session.last_fix().copied(),
        deviation_warnings: tracker.deviation_warnings().len(),
    }
}

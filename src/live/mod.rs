mod run;
mod source;

pub use run::{LiveRun, RunRecorder};
pub use source::{BroadcastSource, FixCallback, PositionSource, Subscription};

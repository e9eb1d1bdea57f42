pub mod engine;
pub mod similarity;
pub mod snapshot;
pub mod stats;

pub use engine::{Phase, Scheduler};
pub use snapshot::{Snapshot, SnapshotError, SnapshotStore, TurnSnapshot};
pub use stats::{SchedulerCounters, TurnStats};

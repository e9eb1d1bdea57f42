//! The cyclic turn scheduler engine.
//!
//! Split into focused submodules:
//! - `state`: the mutex-owned state (turn ring, command arena, history,
//!   live connections, counters) and its transitions
//! - `core`: the `Scheduler` handle — lifecycle, projections, persistence
//! - `admission`: `submit`, `preseed_next` and `execute_immediately`
//! - `heartbeat`: the background thread driving time-based transitions

mod admission;
mod core;
mod heartbeat;
mod state;

pub use self::core::Scheduler;
pub use heartbeat::HEARTBEAT_INTERVAL;
pub use state::{Phase, SchedulerState, SharedState};

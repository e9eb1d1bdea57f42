use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::snapshot::SnapshotStore;

use super::state::{Phase, SharedState};

/// Heartbeat wake period.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(250);

/// Spawn the background heartbeat thread.
///
/// Each wake: advance the turn when its wall-clock duration has elapsed,
/// apply one decay tick, and write a snapshot when the snapshot interval has
/// elapsed. Snapshot capture happens under the state lock, file I/O outside
/// it; a failed write is logged and never aborts the loop.
pub(super) fn spawn_heartbeat(
    state: SharedState,
    store: SnapshotStore,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        info!("heartbeat started");
        let mut last_snapshot = Instant::now();

        while !shutdown.load(Ordering::Relaxed) {
            std::thread::sleep(HEARTBEAT_INTERVAL);

            let snapshot = {
                let mut state = state.lock().unwrap();

                if state.phase == Phase::Running {
                    let elapsed = state.turns[state.current_turn].elapsed_seconds();
                    if elapsed >= state.config.turn_duration_seconds as i64 {
                        state.advance_turn(&mut rand::thread_rng());
                    }
                }

                state.decay_connections();

                if last_snapshot.elapsed() >= state.config.snapshot_interval() {
                    last_snapshot = Instant::now();
                    Some(state.capture_snapshot())
                } else {
                    None
                }
            };

            if let Some(snapshot) = snapshot {
                match store.save(&snapshot) {
                    Ok(path) => debug!(path = %path.display(), "snapshot written"),
                    Err(e) => warn!(error = %e, "snapshot failed"),
                }
            }
        }

        info!("heartbeat stopped");
    })
}

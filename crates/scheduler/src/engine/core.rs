use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use tracing::{info, warn};

use rota_core::{Connection, SchedulerConfig};

use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::stats::{self, SchedulerCounters, TurnStats};

use super::heartbeat::spawn_heartbeat;
use super::state::{Phase, SchedulerState, SharedState};

/// The cyclic turn scheduler.
///
/// Owns the turn ring, the command arena, the rolling history and the live
/// connection set behind a single mutex; a background heartbeat thread
/// drives wall-clock turn transitions, connection decay and periodic
/// snapshots while callers invoke the public operations concurrently.
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    pub(super) state: SharedState,
    pub(super) store: SnapshotStore,
    /// Heartbeat shutdown signal.
    pub(super) shutdown: Arc<AtomicBool>,
    /// Join handle of the running heartbeat thread.
    pub(super) heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Create a scheduler in the `Idle` phase. Fails only if the snapshot
    /// directory cannot be created.
    pub fn new(config: SchedulerConfig) -> Result<Self, SnapshotError> {
        let store = SnapshotStore::new(config.data_dir.join("scheduler"))?;
        let state = Arc::new(Mutex::new(SchedulerState::new(config.clone())));
        Ok(Self {
            config,
            state,
            store,
            shutdown: Arc::new(AtomicBool::new(false)),
            heartbeat: Mutex::new(None),
        })
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap()
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Enter the `Running` phase: activates the current turn and spawns the
    /// heartbeat. Idempotent — returns whether a transition happened.
    pub fn start(&self) -> bool {
        {
            let mut state = self.lock();
            if state.phase == Phase::Running {
                return false;
            }
            state.phase = Phase::Running;
            let current = state.current_turn;
            state.turns[current].start();
        }

        self.shutdown.store(false, Ordering::Relaxed);
        let handle = spawn_heartbeat(
            Arc::clone(&self.state),
            self.store.clone(),
            Arc::clone(&self.shutdown),
        );
        *self.heartbeat.lock().unwrap() = Some(handle);

        info!("scheduler started");
        true
    }

    /// Leave the `Running` phase: stops the heartbeat, writes one final
    /// snapshot, then releases. Idempotent — returns whether a transition
    /// happened.
    pub fn stop(&self) -> bool {
        {
            let mut state = self.lock();
            if state.phase != Phase::Running {
                return false;
            }
            state.phase = Phase::Stopped;
        }

        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.heartbeat.lock().unwrap().take() {
            if handle.join().is_err() {
                warn!("heartbeat thread panicked");
            }
        }

        match self.save_snapshot() {
            Ok(path) => info!(path = %path.display(), "final snapshot written"),
            Err(e) => warn!(error = %e, "final snapshot failed"),
        }

        info!("scheduler stopped");
        true
    }

    /// Manual override of the timer-driven turn transition.
    /// Returns `false` when not running.
    pub fn advance_turn(&self) -> bool {
        let mut state = self.lock();
        if state.phase != Phase::Running {
            return false;
        }
        state.advance_turn(&mut rand::thread_rng());
        true
    }

    /// Manual decay tick over the live connection set (the heartbeat applies
    /// the same tick once per wake). Returns the number of edges pruned.
    pub fn decay_tick(&self) -> usize {
        self.lock().decay_connections()
    }

    // ── Read-only projections ───────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    pub fn current_turn(&self) -> usize {
        self.lock().current_turn
    }

    pub fn cycle_count(&self) -> u64 {
        self.lock().cycle_count
    }

    /// Owned snapshot of the aggregate counters.
    pub fn counters(&self) -> SchedulerCounters {
        self.lock().counters.clone()
    }

    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Owned copy of the live connection set.
    pub fn connections(&self) -> Vec<Connection> {
        self.lock().connections.clone()
    }

    /// Progression value of the currently active turn.
    pub fn get_current_progression(&self) -> u32 {
        let state = self.lock();
        u32::from(state.turns[state.current_turn].progression)
    }

    /// Per-turn statistics keyed `"turn_{i}"`.
    pub fn get_turn_statistics(&self) -> HashMap<String, TurnStats> {
        let state = self.lock();
        state
            .turns
            .iter()
            .map(|turn| (format!("turn_{}", turn.index), TurnStats::from_turn(turn)))
            .collect()
    }

    /// Plain-text rendering of the turn ring.
    pub fn get_visualization(&self) -> String {
        let state = self.lock();
        stats::render(state.phase, state.cycle_count, state.current_turn, &state.turns)
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Capture and write a snapshot. Serialization happens under the lock,
    /// file I/O outside it.
    pub fn save_snapshot(&self) -> Result<PathBuf, SnapshotError> {
        let snapshot = self
            .state
            .lock()
            .map_err(|e| SnapshotError::Lock(e.to_string()))?
            .capture_snapshot();
        self.store.save(&snapshot)
    }

    /// Load a snapshot file, fully replacing in-memory state.
    ///
    /// The file is parsed and validated before anything is touched; on any
    /// failure the scheduler is left exactly as it was. The lifecycle phase
    /// is not part of the persisted shape and is kept.
    pub fn load_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = self.store.load(path)?;
        let mut state = self
            .state
            .lock()
            .map_err(|e| SnapshotError::Lock(e.to_string()))?;
        state.apply_snapshot(snapshot);
        info!(path = %path.display(), "snapshot loaded");
        Ok(())
    }

    /// Load the latest `current.json` if one exists. Returns whether state
    /// was replaced.
    pub fn resume_latest(&self) -> Result<bool, SnapshotError> {
        let path = self.store.current_path();
        if !path.exists() {
            return Ok(false);
        }
        self.load_snapshot(&path)?;
        Ok(true)
    }

    /// Directory snapshots are written under.
    pub fn snapshot_dir(&self) -> &Path {
        self.store.base_dir()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // The heartbeat holds an Arc to the state; make sure it exits even
        // when callers never invoked stop().
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.heartbeat.lock().unwrap().take() {
            handle.join().ok();
        }
    }
}

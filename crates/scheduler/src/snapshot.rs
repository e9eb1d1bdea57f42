//! Snapshot persistence.
//!
//! Best-effort periodic persistence of scheduler state, written as
//! pretty-printed JSON under the configured data directory:
//!
//! ```text
//! scheduler/
//!   current.json                <- latest snapshot
//!   snapshots/
//!     2026-08-29T10-15-00.json  <- historical snapshots
//! ```
//!
//! Loading parses and validates fully before any in-memory state is touched;
//! a failed load leaves the scheduler exactly as it was.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rota_core::{Command, CommandId, Turn};

use crate::stats::SchedulerCounters;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    Invalid(String),
    #[error("lock poisoned: {0}")]
    Lock(String),
}

/// One turn plus the full records of the commands it currently holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub turn: Turn,
    pub commands: Vec<Command>,
}

/// The persisted scheduler record: the full turn array with command records,
/// the cyclic pointer, cycle count, bounded history, and aggregate counters.
/// Live connections are not persisted; the graph rebuilds from fresh traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    pub current_turn: usize,
    pub cycle_count: u64,
    pub turns: Vec<TurnSnapshot>,
    pub history: Vec<Command>,
    pub counters: SchedulerCounters,
}

impl Snapshot {
    /// Structural validation, applied before a snapshot may replace state.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.turns.is_empty() {
            return Err(SnapshotError::Invalid("empty turn array".to_string()));
        }
        if self.current_turn >= self.turns.len() {
            return Err(SnapshotError::Invalid(format!(
                "current turn {} out of range (have {} turns)",
                self.current_turn,
                self.turns.len()
            )));
        }
        for (i, ts) in self.turns.iter().enumerate() {
            if ts.turn.index != i {
                return Err(SnapshotError::Invalid(format!(
                    "turn at position {} carries index {}",
                    i, ts.turn.index
                )));
            }
            if ts.turn.commands.len() > ts.turn.capacity {
                return Err(SnapshotError::Invalid(format!(
                    "turn {} holds {} commands over capacity {}",
                    i,
                    ts.turn.commands.len(),
                    ts.turn.capacity
                )));
            }
            if ts.commands.len() != ts.turn.commands.len() {
                return Err(SnapshotError::Invalid(format!(
                    "turn {} command records do not match its id list",
                    i
                )));
            }
            let ids: HashSet<CommandId> = ts.commands.iter().map(|cmd| cmd.id).collect();
            if ts.turn.commands.iter().any(|id| !ids.contains(id)) {
                return Err(SnapshotError::Invalid(format!(
                    "turn {} references a command without a record",
                    i
                )));
            }
        }
        Ok(())
    }
}

/// Filesystem-backed snapshot persistence.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    base_dir: PathBuf,
}

impl SnapshotStore {
    /// Create a new store, ensuring the directory structure exists.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join("snapshots"))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the latest snapshot.
    pub fn current_path(&self) -> PathBuf {
        self.base_dir.join("current.json")
    }

    /// Write the snapshot as `current.json` plus a timestamped historical
    /// copy. Returns the historical path.
    pub fn save(&self, snapshot: &Snapshot) -> Result<PathBuf, SnapshotError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(self.current_path(), &json)?;

        let ts = snapshot.saved_at.format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = self.base_dir.join("snapshots").join(format!("{}.json", ts));
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Read, parse and validate a snapshot file.
    pub fn load(&self, path: &Path) -> Result<Snapshot, SnapshotError> {
        let json = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Load `current.json` if it exists.
    pub fn load_current(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let path = self.current_path();
        if !path.exists() {
            return Ok(None);
        }
        self.load(&path).map(Some)
    }
}

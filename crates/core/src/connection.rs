use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::CommandId;

/// Strength floor. A connection decaying below this is marked inactive and
/// evicted from the live set.
pub const MIN_STRENGTH: f64 = 0.1;

/// How a connection was inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// Cross product of an ending turn's commands and the next turn's
    /// pre-seeded commands.
    Sequential,
    /// Scored above the similarity threshold against a recent command.
    Similarity,
}

impl std::fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionKind::Sequential => write!(f, "sequential"),
            ConnectionKind::Similarity => write!(f, "similarity"),
        }
    }
}

/// A directed, weighted, decaying edge between two commands.
///
/// Source and target are ids into the scheduler-owned command arena; a
/// connection never owns, creates or destroys a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub source: CommandId,
    pub target: CommandId,
    /// In (0,1]; monotonically non-increasing between decay applications.
    pub strength: f64,
    pub kind: ConnectionKind,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl Connection {
    pub fn new(source: CommandId, target: CommandId, kind: ConnectionKind, strength: f64) -> Self {
        Self {
            source,
            target,
            strength: strength.clamp(MIN_STRENGTH, 1.0),
            kind,
            created_at: Utc::now(),
            active: true,
        }
    }

    /// Apply one multiplicative decay tick: `strength *= 1 - rate`.
    /// Deactivates once strength drops below [`MIN_STRENGTH`].
    pub fn apply_decay(&mut self, rate: f64) {
        self.strength *= 1.0 - rate;
        if self.strength < MIN_STRENGTH {
            self.active = false;
        }
    }
}

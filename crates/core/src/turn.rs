use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandId};
use crate::easing::Easing;

/// One fixed-capacity scheduling slot in the cyclic turn sequence.
///
/// Turns are pre-allocated at scheduler construction and reused across
/// cycles. A turn holds command ids only; the command records themselves
/// live in the scheduler-owned arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub index: usize,
    /// Derived from the progression sequence: `progression + 1`.
    pub capacity: usize,
    /// Raw sequence value, exposed for bias calculations.
    pub progression: u8,
    pub easing: Easing,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub complete: bool,
    /// Successful / total over this turn's commands at the time it ended.
    pub success_rate: f64,
    pub commands: Vec<CommandId>,
}

impl Turn {
    pub fn new(index: usize, progression: u8, easing: Easing) -> Self {
        Self {
            index,
            capacity: progression as usize + 1,
            progression,
            easing,
            started_at: None,
            ended_at: None,
            active: false,
            complete: false,
            success_rate: 0.0,
            commands: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.commands.len() >= self.capacity
    }

    /// Admit a command: stamps its turn index and appends its id.
    /// Rejects without side effects when at capacity — the caller owns the
    /// fallback path (immediate execution or discard).
    pub fn admit(&mut self, command: &mut Command) -> bool {
        if self.is_full() {
            return false;
        }
        command.turn_index = self.index;
        self.commands.push(command.id);
        true
    }

    /// Activate the turn: records the activation timestamp and resets
    /// completion state. Commands pre-seeded before activation are kept.
    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
        self.ended_at = None;
        self.active = true;
        self.complete = false;
        self.success_rate = 0.0;
    }

    /// Finalize the turn: records the completion timestamp and computes the
    /// success rate over its commands from the arena (0 if empty). The
    /// scheduler clears the command list afterwards, once sequential
    /// connections have been formed.
    pub fn end(&mut self, arena: &HashMap<CommandId, Command>) {
        self.ended_at = Some(Utc::now());
        self.active = false;
        self.complete = true;

        let total = self.commands.len();
        if total == 0 {
            self.success_rate = 0.0;
            return;
        }
        let successes = self
            .commands
            .iter()
            .filter(|id| {
                arena
                    .get(*id)
                    .and_then(|cmd| cmd.success)
                    .unwrap_or(false)
            })
            .count();
        self.success_rate = successes as f64 / total as f64;
    }

    /// Seconds elapsed since activation, or 0 when not started.
    pub fn elapsed_seconds(&self) -> i64 {
        self.started_at
            .map(|started| Utc::now().signed_duration_since(started).num_seconds())
            .unwrap_or(0)
    }
}

use serde::{Deserialize, Serialize};

use rota_core::Turn;

use crate::engine::Phase;

/// Read-only projection of one turn, exposed to collaborators via
/// `get_turn_statistics()`.
#[derive(Debug, Clone, Serialize)]
pub struct TurnStats {
    pub commands: usize,
    pub capacity: usize,
    pub progression: u8,
    pub easing: String,
    pub success_rate: f64,
    pub complete: bool,
}

impl TurnStats {
    pub fn from_turn(turn: &Turn) -> Self {
        Self {
            commands: turn.commands.len(),
            capacity: turn.capacity,
            progression: turn.progression,
            easing: turn.easing.to_string(),
            success_rate: turn.success_rate,
            complete: turn.complete,
        }
    }
}

/// Aggregate scheduler counters, carried in snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerCounters {
    pub commands_executed: u64,
    pub commands_succeeded: u64,
    pub commands_failed: u64,
    pub turns_completed: u64,
    pub cycles_completed: u64,
    pub connections_created: u64,
}

impl SchedulerCounters {
    /// Record one execution draw. A modeled failure is a normal outcome and
    /// counted as such, never surfaced as a fault.
    pub fn record_execution(&mut self, success: bool) {
        self.commands_executed += 1;
        if success {
            self.commands_succeeded += 1;
        } else {
            self.commands_failed += 1;
        }
    }
}

/// Plain-text rendering of the turn ring for `get_visualization()`.
///
/// Derived only from read-only projections; the richer presentation layers
/// are external collaborators consuming the same accessors.
pub fn render(phase: Phase, cycle_count: u64, current_turn: usize, turns: &[Turn]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "rota scheduler | phase {:?} | cycle {} | turn {}/{}\n",
        phase,
        cycle_count,
        current_turn,
        turns.len()
    ));
    for turn in turns {
        let marker = if turn.index == current_turn { '>' } else { ' ' };
        let filled = turn.commands.len().min(turn.capacity);
        let bar: String = std::iter::repeat('#')
            .take(filled)
            .chain(std::iter::repeat('.').take(turn.capacity - filled))
            .collect();
        out.push_str(&format!(
            "{} turn {:>2} [{}] {}/{} {} {}\n",
            marker,
            turn.index,
            bar,
            turn.commands.len(),
            turn.capacity,
            turn.easing,
            if turn.complete {
                format!("complete ({:.0}%)", turn.success_rate * 100.0)
            } else if turn.active {
                "active".to_string()
            } else {
                "idle".to_string()
            }
        ));
    }
    out
}

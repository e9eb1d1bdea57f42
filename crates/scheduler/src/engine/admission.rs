use tracing::debug;

use rota_core::{Command, CommandClass, ExecutionOutcome};

use super::state::Phase;
use super::Scheduler;

impl Scheduler {
    /// Submit a command into the currently active turn.
    ///
    /// Fails closed: not running, or the active turn is at capacity, means
    /// `false` and no mutation. Overflow is always visible to the caller —
    /// the fallback (immediate execution or discard) is the caller's choice.
    pub fn submit(&self, text: &str, class: CommandClass, priority: u8) -> bool {
        let mut state = self.lock();
        if state.phase != Phase::Running {
            return false;
        }
        let current = state.current_turn;
        if state.turns[current].is_full() {
            debug!(turn = current, "submission rejected, turn full");
            return false;
        }

        let mut command = Command::new(text, Some(class), priority);
        state.turns[current].admit(&mut command);
        debug!(command = %command.id, turn = current, "command admitted");
        state.record_command(command);
        true
    }

    /// Place a command into the *next* turn ahead of its activation,
    /// capacity-checked exactly like `submit`. Pre-seeded commands are what
    /// sequential connections form against at the turn boundary.
    pub fn preseed_next(&self, text: &str, class: CommandClass, priority: u8) -> bool {
        let mut state = self.lock();
        if state.phase != Phase::Running {
            return false;
        }
        let next = (state.current_turn + 1) % state.turns.len();
        if state.turns[next].is_full() {
            debug!(turn = next, "pre-seed rejected, turn full");
            return false;
        }

        let mut command = Command::new(text, Some(class), priority);
        state.turns[next].admit(&mut command);
        debug!(command = %command.id, turn = next, "command pre-seeded");
        state.record_command(command);
        true
    }

    /// Execute a command right away, bypassing turn capacity, at maximum
    /// priority. Always recorded in history and eligible for similarity
    /// linking, in any phase — the current turn index supplies the position
    /// bias.
    pub fn execute_immediately(&self, text: &str) -> ExecutionOutcome {
        let mut state = self.lock();
        let mut command = Command::new(text, None, 10);
        command.turn_index = state.current_turn;

        let ctx = state.execution_context();
        let outcome = command.execute(&ctx, &mut rand::thread_rng());
        state.counters.record_execution(outcome.success);
        debug!(
            command = %command.id,
            success = outcome.success,
            "immediate execution"
        );
        state.record_command(command);
        outcome
    }
}

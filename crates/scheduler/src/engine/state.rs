use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use rand::Rng;
use tracing::{debug, info};

use rota_core::{
    Command, CommandId, Connection, ConnectionKind, Easing, ExecutionContext, ExecutionOutcome,
    SchedulerConfig, Turn,
};

use crate::similarity::{similarity_score, SIMILARITY_THRESHOLD, SIMILARITY_WINDOW};
use crate::snapshot::Snapshot;
use crate::stats::SchedulerCounters;

/// Scheduler lifecycle phase. Running is re-entered only by an explicit
/// `start()`, never implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopped,
}

/// Easing families assigned to turns round-robin by index.
const TURN_EASINGS: &[Easing] = &[
    Easing::Linear,
    Easing::QuadInOut,
    Easing::CubicInOut,
    Easing::SineInOut,
];

/// All mutable scheduler state, owned exclusively behind one mutex.
///
/// Turn, Command and Connection values live here and are never
/// independently synchronized; the heartbeat and caller-invoked methods
/// serialize through the owning lock.
pub struct SchedulerState {
    pub config: SchedulerConfig,
    pub turns: Vec<Turn>,
    pub current_turn: usize,
    pub cycle_count: u64,
    /// Single owner of all command records. Turns, history and connections
    /// hold ids into this arena only.
    pub arena: HashMap<CommandId, Command>,
    /// Rolling history of recorded commands, newest at the back.
    pub history: VecDeque<CommandId>,
    /// Live connection set. Decayed-out edges are removed here.
    pub connections: Vec<Connection>,
    pub counters: SchedulerCounters,
    pub phase: Phase,
}

/// Thread-safe handle to the scheduler state.
pub type SharedState = Arc<Mutex<SchedulerState>>;

impl SchedulerState {
    pub fn new(config: SchedulerConfig) -> Self {
        let turns = (0..config.turn_count)
            .map(|i| {
                Turn::new(
                    i,
                    config.progression_for(i),
                    TURN_EASINGS[i % TURN_EASINGS.len()],
                )
            })
            .collect();
        Self {
            config,
            turns,
            current_turn: 0,
            cycle_count: 0,
            arena: HashMap::new(),
            history: VecDeque::new(),
            connections: Vec::new(),
            counters: SchedulerCounters::default(),
            phase: Phase::Idle,
        }
    }

    pub fn execution_context(&self) -> ExecutionContext {
        ExecutionContext {
            turn_count: self.config.turn_count,
            enhanced_mode: self.config.enhanced_mode,
            enhanced_multiplier: self.config.enhanced_multiplier,
        }
    }

    // ── Command recording ───────────────────────────────────────

    /// Place a command into the arena and the rolling history, forming
    /// similarity connections against the recent window first.
    pub fn record_command(&mut self, command: Command) {
        self.link_similar(&command);
        self.history.push_back(command.id);
        self.arena.insert(command.id, command);
        self.truncate_history();
    }

    /// Score the new command against the last `SIMILARITY_WINDOW` history
    /// entries; every qualifying pair forms a recent -> new connection.
    fn link_similar(&mut self, command: &Command) {
        let mut formed = 0u64;
        for recent_id in self.history.iter().rev().take(SIMILARITY_WINDOW) {
            let Some(recent) = self.arena.get(recent_id) else {
                continue;
            };
            let score = similarity_score(recent, command);
            if score > SIMILARITY_THRESHOLD {
                self.connections.push(Connection::new(
                    *recent_id,
                    command.id,
                    ConnectionKind::Similarity,
                    self.config.base_connection_strength,
                ));
                formed += 1;
            }
        }
        if formed > 0 {
            debug!(command = %command.id, formed, "similarity connections formed");
            self.counters.connections_created += formed;
        }
    }

    /// Drop oldest history entries past the retention bound, evicting their
    /// arena records when nothing references them anymore.
    fn truncate_history(&mut self) {
        while self.history.len() > self.config.history_retention {
            if let Some(old) = self.history.pop_front() {
                self.evict_if_unreferenced(old);
            }
        }
    }

    /// A command record leaves the arena only once it is referenced neither
    /// by the history nor by any turn's current command list.
    fn evict_if_unreferenced(&mut self, id: CommandId) {
        let referenced = self.history.contains(&id)
            || self.turns.iter().any(|turn| turn.commands.contains(&id));
        if !referenced {
            self.arena.remove(&id);
        }
    }

    // ── Execution ───────────────────────────────────────────────

    /// Execute one arena command and fold the outcome into the counters.
    /// Exhausted (over-budget) outcomes are terminal and not re-counted.
    pub fn execute_command<R: Rng>(
        &mut self,
        id: CommandId,
        rng: &mut R,
    ) -> Option<ExecutionOutcome> {
        let ctx = self.execution_context();
        let command = self.arena.get_mut(&id)?;
        let outcome = command.execute(&ctx, rng);
        if !outcome.exhausted {
            self.counters.record_execution(outcome.success);
        }
        Some(outcome)
    }

    /// Execute every unexecuted command in the current turn, in descending
    /// priority (ties broken by submission order).
    pub fn flush_pending<R: Rng>(&mut self, rng: &mut R) -> Vec<ExecutionOutcome> {
        let mut pending: Vec<(u8, usize, CommandId)> = self.turns[self.current_turn]
            .commands
            .iter()
            .enumerate()
            .filter_map(|(pos, id)| {
                self.arena
                    .get(id)
                    .filter(|cmd| !cmd.executed)
                    .map(|cmd| (cmd.priority, pos, *id))
            })
            .collect();
        // Highest priority first; the submission position keeps ties stable.
        pending.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        pending
            .into_iter()
            .filter_map(|(_, _, id)| self.execute_command(id, rng))
            .collect()
    }

    // ── Turn transitions ────────────────────────────────────────

    /// Advance the cyclic pointer: flush and end the active turn, form
    /// sequential connections against the next turn's pre-seeded commands,
    /// clear the ended turn, then activate the next one.
    pub fn advance_turn<R: Rng>(&mut self, rng: &mut R) {
        let ending = self.current_turn;
        let next = (ending + 1) % self.turns.len();

        if self.turns[ending].active {
            self.flush_pending(rng);
            let arena = &self.arena;
            self.turns[ending].end(arena);
            self.counters.turns_completed += 1;

            self.link_sequential(ending, next);

            // The ended turn keeps its statistics; its command list is
            // cleared so the slot is fresh when the pointer returns.
            let ended_ids = std::mem::take(&mut self.turns[ending].commands);
            for id in ended_ids {
                self.evict_if_unreferenced(id);
            }
        }

        self.current_turn = next;
        if next == 0 {
            self.cycle_count += 1;
            self.counters.cycles_completed += 1;
        }
        self.turns[next].start();
        info!(
            turn = next,
            cycle = self.cycle_count,
            "turn started"
        );
    }

    /// Cross product of the ending turn's commands and the commands already
    /// pre-seeded into the next turn. A no-op unless callers pre-seeded.
    fn link_sequential(&mut self, ending: usize, next: usize) {
        let mut formed = 0u64;
        for source in self.turns[ending].commands.clone() {
            for target in self.turns[next].commands.clone() {
                self.connections.push(Connection::new(
                    source,
                    target,
                    ConnectionKind::Sequential,
                    self.config.base_connection_strength,
                ));
                formed += 1;
            }
        }
        if formed > 0 {
            debug!(ending, next, formed, "sequential connections formed");
            self.counters.connections_created += formed;
        }
    }

    // ── Decay ───────────────────────────────────────────────────

    /// One decay tick over the live connection set; edges dropping below the
    /// strength floor are pruned. Returns the number pruned.
    pub fn decay_connections(&mut self) -> usize {
        let rate = self.config.decay_rate;
        for connection in &mut self.connections {
            connection.apply_decay(rate);
        }
        let before = self.connections.len();
        self.connections.retain(|connection| connection.active);
        let pruned = before - self.connections.len();
        if pruned > 0 {
            debug!(pruned, live = self.connections.len(), "connections pruned");
        }
        pruned
    }

    // ── Snapshot conversion ─────────────────────────────────────

    /// Capture the persisted shape of the current state.
    pub fn capture_snapshot(&self) -> Snapshot {
        use crate::snapshot::TurnSnapshot;

        let turns = self
            .turns
            .iter()
            .map(|turn| TurnSnapshot {
                turn: turn.clone(),
                commands: turn
                    .commands
                    .iter()
                    .filter_map(|id| self.arena.get(id).cloned())
                    .collect(),
            })
            .collect();
        let history = self
            .history
            .iter()
            .filter_map(|id| self.arena.get(id).cloned())
            .collect();

        Snapshot {
            saved_at: chrono::Utc::now(),
            current_turn: self.current_turn,
            cycle_count: self.cycle_count,
            turns,
            history,
            counters: self.counters.clone(),
        }
    }

    /// Replace state from a validated snapshot. The lifecycle phase is kept;
    /// live connections are not persisted and start empty.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let mut arena = HashMap::new();
        let mut history = VecDeque::new();
        for command in snapshot.history {
            history.push_back(command.id);
            arena.insert(command.id, command);
        }
        let mut turns = Vec::with_capacity(snapshot.turns.len());
        for ts in snapshot.turns {
            for command in ts.commands {
                arena.insert(command.id, command);
            }
            turns.push(ts.turn);
        }

        self.turns = turns;
        self.current_turn = snapshot.current_turn;
        self.cycle_count = snapshot.cycle_count;
        self.arena = arena;
        self.history = history;
        self.connections.clear();
        self.counters = snapshot.counters;
    }
}

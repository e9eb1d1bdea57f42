use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::easing::Easing;

/// Unique command identifier, stable across snapshot round-trips.
pub type CommandId = Uuid;

/// Attempt budget per command. Execution beyond this returns a terminal
/// outcome without mutating the command.
pub const MAX_ATTEMPTS: u32 = 3;

/// Base success probability before progression and position bias.
pub const BASE_SUCCESS_PROBABILITY: f64 = 0.7;

/// Closed set of command classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandClass {
    System,
    Connection,
    Turn,
    Visualization,
    Data,
    Meta,
}

impl Default for CommandClass {
    fn default() -> Self {
        CommandClass::System
    }
}

impl std::fmt::Display for CommandClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandClass::System => write!(f, "system"),
            CommandClass::Connection => write!(f, "connection"),
            CommandClass::Turn => write!(f, "turn"),
            CommandClass::Visualization => write!(f, "visualization"),
            CommandClass::Data => write!(f, "data"),
            CommandClass::Meta => write!(f, "meta"),
        }
    }
}

/// Fields extracted from raw command text by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub class: CommandClass,
    /// `#`-prefixed tokens, marker stripped, order irrelevant.
    pub tags: Vec<String>,
    /// First standalone integer in 0-5; anything else normalizes to 0.
    pub progression: u8,
    /// First recognized easing keyword; fallback linear.
    pub easing: Easing,
}

/// Keyword groups checked in order; the first group with a hit wins.
/// `System` is the fallthrough when nothing matches.
const CLASS_KEYWORDS: &[(CommandClass, &[&str])] = &[
    (CommandClass::Connection, &["connect", "link", "edge", "relate"]),
    (CommandClass::Turn, &["turn", "cycle", "advance", "slot"]),
    (CommandClass::Visualization, &["visual", "display", "render", "show"]),
    (CommandClass::Data, &["data", "save", "load", "store", "snapshot"]),
    (CommandClass::Meta, &["meta", "config", "status", "info"]),
];

/// Deterministic, order-sensitive keyword scan over raw command text.
///
/// A pure, total function: every input produces a classification. Unknown
/// text classifies as `System`, unparsable progression tokens normalize to 0
/// and unrecognized easing names to linear.
pub fn classify(text: &str) -> Classification {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let class = CLASS_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(class, _)| *class)
        .unwrap_or(CommandClass::System);

    let tags: Vec<String> = tokens
        .iter()
        .filter_map(|tok| tok.strip_prefix('#'))
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();

    let progression = tokens
        .iter()
        .filter_map(|tok| tok.parse::<u8>().ok())
        .find(|v| *v <= 5)
        .unwrap_or(0);

    let easing = tokens
        .iter()
        .filter_map(|tok| Easing::parse(tok))
        .next()
        .unwrap_or(Easing::Linear);

    Classification { class, tags, progression, easing }
}

/// Immutable inputs to a probability draw, derived from the scheduler
/// configuration at construction time. Never a process-wide singleton.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext {
    /// Number of turns in the cycle (positions the bias curve).
    pub turn_count: usize,
    pub enhanced_mode: bool,
    pub enhanced_multiplier: f64,
}

/// Result of one execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub command_id: CommandId,
    pub success: bool,
    /// Probability the draw was made against (0 for exhausted outcomes).
    pub probability: f64,
    pub attempts: u32,
    /// True when the attempt budget was already spent and nothing mutated.
    pub exhausted: bool,
    pub message: String,
}

/// A unit of work admitted into a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub text: String,
    pub class: CommandClass,
    /// 1-10, 10 highest. Out-of-range input is clamped at construction.
    pub priority: u8,
    /// Index of the turn this command was admitted into.
    pub turn_index: usize,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub executed: bool,
    pub success: Option<bool>,
    pub progression: u8,
    pub easing: Easing,
    pub tags: Vec<String>,
    pub attempts: u32,
    pub result: Option<String>,
}

impl Command {
    /// Create a command from raw text. `class` overrides the parsed
    /// classification when given; tags, progression and easing always come
    /// from the text.
    pub fn new(text: &str, class: Option<CommandClass>, priority: u8) -> Self {
        let parsed = classify(text);
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            class: class.unwrap_or(parsed.class),
            priority: priority.clamp(1, 10),
            turn_index: 0,
            created_at: Utc::now(),
            executed_at: None,
            executed: false,
            success: None,
            progression: parsed.progression,
            easing: parsed.easing,
            tags: parsed.tags,
            attempts: 0,
            result: None,
        }
    }

    /// Success probability for this command at its assigned turn position.
    ///
    /// `p = base + progression * 0.05`, scaled by the enhanced multiplier
    /// when enabled, then biased by `0.8 + 0.4 * ease(turn_index / (N-1))`.
    pub fn success_probability(&self, ctx: &ExecutionContext) -> f64 {
        let mut p = BASE_SUCCESS_PROBABILITY + f64::from(self.progression) * 0.05;
        if ctx.enhanced_mode {
            p *= ctx.enhanced_multiplier;
        }
        let t = self.turn_index as f64 / ctx.turn_count.saturating_sub(1).max(1) as f64;
        p *= 0.8 + 0.4 * self.easing.ease(t);
        p.clamp(0.0, 1.0)
    }

    /// Execute (or retry) the command: one probability draw against the
    /// position-biased success probability.
    ///
    /// Legal while `attempts < MAX_ATTEMPTS`; past the budget this returns a
    /// terminal outcome and mutates nothing. A `success = false` draw is a
    /// modeled business outcome, never a fault.
    pub fn execute<R: Rng>(&mut self, ctx: &ExecutionContext, rng: &mut R) -> ExecutionOutcome {
        if self.attempts >= MAX_ATTEMPTS {
            return ExecutionOutcome {
                command_id: self.id,
                success: self.success.unwrap_or(false),
                probability: 0.0,
                attempts: self.attempts,
                exhausted: true,
                message: format!("max attempts reached ({MAX_ATTEMPTS})"),
            };
        }

        self.attempts += 1;
        let probability = self.success_probability(ctx);
        let success = rng.gen::<f64>() < probability;

        let message = if success {
            format!("'{}' completed (p={:.2}, attempt {})", self.text, probability, self.attempts)
        } else {
            format!("'{}' failed (p={:.2}, attempt {})", self.text, probability, self.attempts)
        };

        self.executed = true;
        self.executed_at = Some(Utc::now());
        self.success = Some(success);
        self.result = Some(message.clone());

        ExecutionOutcome {
            command_id: self.id,
            success,
            probability,
            attempts: self.attempts,
            exhausted: false,
            message,
        }
    }

    /// Whether another execution attempt is allowed.
    pub fn can_retry(&self) -> bool {
        self.attempts < MAX_ATTEMPTS
    }
}

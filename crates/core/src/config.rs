use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Scheduler configuration. All knobs are provided once at construction and
/// are immutable for the lifetime of the scheduler instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of turns in one cycle.
    #[serde(default = "default_turn_count")]
    pub turn_count: usize,
    /// Progression values assigned to turns round-robin. Each value also
    /// derives the turn's capacity (`value + 1`).
    #[serde(default = "default_progression_sequence")]
    pub progression_sequence: Vec<u8>,
    /// Wall-clock duration of one turn in seconds.
    #[serde(default = "default_turn_duration")]
    pub turn_duration_seconds: u64,
    /// Per-heartbeat multiplicative decay applied to connection strength.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
    /// Initial strength of newly formed connections, in (0,1].
    #[serde(default = "default_base_strength")]
    pub base_connection_strength: f64,
    /// When enabled, command success probability is boosted by
    /// `enhanced_multiplier`.
    #[serde(default)]
    pub enhanced_mode: bool,
    /// Success probability multiplier applied in enhanced mode.
    #[serde(default = "default_enhanced_multiplier")]
    pub enhanced_multiplier: f64,
    /// Maximum number of commands retained in the rolling history.
    #[serde(default = "default_history_retention")]
    pub history_retention: usize,
    /// Seconds between periodic snapshot writes.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_seconds: u64,
    /// Directory snapshots are written under.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_turn_count() -> usize { 12 }
fn default_progression_sequence() -> Vec<u8> { vec![0, 1, 2, 3, 6, 8, 9, 8, 1, 2] }
fn default_turn_duration() -> u64 { 30 }
fn default_decay_rate() -> f64 { 0.02 }
fn default_base_strength() -> f64 { 0.5 }
fn default_enhanced_multiplier() -> f64 { 1.2 }
fn default_history_retention() -> usize { 500 }
fn default_snapshot_interval() -> u64 { 60 }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            turn_count: default_turn_count(),
            progression_sequence: default_progression_sequence(),
            turn_duration_seconds: default_turn_duration(),
            decay_rate: default_decay_rate(),
            base_connection_strength: default_base_strength(),
            enhanced_mode: false,
            enhanced_multiplier: default_enhanced_multiplier(),
            history_retention: default_history_retention(),
            snapshot_interval_seconds: default_snapshot_interval(),
            data_dir: default_data_dir(),
        }
    }
}

impl SchedulerConfig {
    /// Build config from `ROTA_*` environment variables
    /// (call `load_dotenv()` first). Unset or unparsable values take the
    /// documented defaults.
    pub fn from_env() -> Self {
        let sequence = env::var("ROTA_PROGRESSION_SEQUENCE")
            .ok()
            .map(|raw| parse_sequence(&raw))
            .filter(|seq| !seq.is_empty())
            .unwrap_or_else(default_progression_sequence);

        Self {
            turn_count: env_parse("ROTA_TURN_COUNT", default_turn_count()).max(1),
            progression_sequence: sequence,
            turn_duration_seconds: env_parse("ROTA_TURN_SECONDS", default_turn_duration()),
            decay_rate: env_parse("ROTA_DECAY_RATE", default_decay_rate()),
            base_connection_strength: env_parse("ROTA_BASE_STRENGTH", default_base_strength()),
            enhanced_mode: env_or("ROTA_ENHANCED_MODE", "false") == "true",
            enhanced_multiplier: env_parse("ROTA_ENHANCED_MULTIPLIER", default_enhanced_multiplier()),
            history_retention: env_parse("ROTA_HISTORY_RETENTION", default_history_retention()),
            snapshot_interval_seconds: env_parse("ROTA_SNAPSHOT_SECONDS", default_snapshot_interval()),
            data_dir: PathBuf::from(env_or("ROTA_DATA_DIR", "data")),
        }
    }

    /// Wall-clock duration of one turn.
    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs(self.turn_duration_seconds)
    }

    /// Interval between periodic snapshots.
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_seconds)
    }

    /// Capacity of the turn at `index`, derived from the progression
    /// sequence: `sequence[index mod len] + 1`.
    pub fn capacity_for(&self, index: usize) -> usize {
        self.progression_for(index) as usize + 1
    }

    /// Progression value of the turn at `index`.
    pub fn progression_for(&self, index: usize) -> u8 {
        self.progression_sequence[index % self.progression_sequence.len()]
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  turns:       count={}, duration={}s, sequence={:?}",
            self.turn_count,
            self.turn_duration_seconds,
            self.progression_sequence
        );
        tracing::info!(
            "  connections: base_strength={}, decay_rate={}",
            self.base_connection_strength,
            self.decay_rate
        );
        tracing::info!(
            "  execution:   enhanced_mode={}, multiplier={}",
            self.enhanced_mode,
            self.enhanced_multiplier
        );
        tracing::info!(
            "  persistence: data_dir={}, snapshot_interval={}s, history={}",
            self.data_dir.display(),
            self.snapshot_interval_seconds,
            self.history_retention
        );
    }
}

/// Parse a comma-separated progression sequence. Unparsable tokens are
/// skipped rather than erroring.
fn parse_sequence(raw: &str) -> Vec<u8> {
    raw.split(',')
        .filter_map(|tok| tok.trim().parse::<u8>().ok())
        .collect()
}

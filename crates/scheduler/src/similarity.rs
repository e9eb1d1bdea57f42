//! Similarity scoring between commands.
//!
//! On every recorded command the scheduler scores it against the most recent
//! history entries; each qualifying pair forms a `Similarity` connection.
//! The score accumulates weighted contributions and has no upper cap.

use std::collections::HashSet;

use rota_core::Command;

/// A pair scoring strictly above this forms a connection.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// How many recent history entries a new command is scored against.
pub const SIMILARITY_WINDOW: usize = 10;

/// Accumulated similarity score:
/// same classification +0.3, word overlap x0.1, same progression +0.2,
/// tag overlap x0.1.
pub fn similarity_score(a: &Command, b: &Command) -> f64 {
    let mut score = 0.0;
    if a.class == b.class {
        score += 0.3;
    }
    score += word_overlap(&a.text, &b.text) as f64 * 0.1;
    if a.progression == b.progression {
        score += 0.2;
    }
    score += tag_overlap(&a.tags, &b.tags) as f64 * 0.1;
    score
}

/// Distinct shared lowercase words. `#`-prefixed tags are excluded here;
/// they are scored by their own term.
fn word_overlap(a: &str, b: &str) -> usize {
    let words = |text: &str| -> HashSet<String> {
        text.to_lowercase()
            .split_whitespace()
            .filter(|tok| !tok.starts_with('#'))
            .map(str::to_string)
            .collect()
    };
    words(a).intersection(&words(b)).count()
}

fn tag_overlap(a: &[String], b: &[String]) -> usize {
    let left: HashSet<&str> = a.iter().map(String::as_str).collect();
    b.iter().filter(|tag| left.contains(tag.as_str())).count()
}

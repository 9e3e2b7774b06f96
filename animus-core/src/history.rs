//! Recency buffer of recent dialogue turns.

use std::collections::VecDeque;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// One committed dialogue exchange, with the persona-side context that
/// accompanied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    /// Turn number at which the exchange committed (1-based).
    pub turn: u64,
    /// What the player typed.
    pub player: String,
    /// The persona's spoken reply.
    pub speech: String,
    /// The persona's private thought that turn.
    pub thought: String,
    /// The generator's emotion tag for the reply.
    pub emotion: String,
    /// Visual description attached to the turn, empty if none.
    #[serde(default)]
    pub visual: String,
    /// Scene background active when the turn committed.
    #[serde(default)]
    pub background: String,
}

/// Sliding window of the most recent committed turns, oldest first.
///
/// Only committed turns enter the buffer; fallback and fatal turns
/// leave it untouched so failed exchanges never contaminate the
/// generation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyBuffer {
    turns: VecDeque<DialogueTurn>,
    capacity: usize,
}

impl RecencyBuffer {
    /// Create an empty buffer holding at most `capacity` turns.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a committed turn, evicting the oldest when full.
    pub fn push(&mut self, turn: DialogueTurn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Number of turns currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the buffer holds no turns yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Iterate oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &DialogueTurn> {
        self.turns.iter()
    }

    /// Render the window as a prompt section, oldest first. Each turn
    /// carries speech and thought; visual description and background
    /// appear only when non-empty.
    #[must_use]
    pub fn format_for_prompt(&self, persona_name: &str, player_name: &str) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            let _ = writeln!(out, "[Turn {}]", turn.turn);
            let _ = writeln!(out, "{player_name}: {}", turn.player);
            let _ = writeln!(out, "{persona_name} (speech): {}", turn.speech);
            let _ = writeln!(out, "{persona_name} (thought): {}", turn.thought);
            if !turn.visual.is_empty() {
                let _ = writeln!(out, "Visual: {}", turn.visual);
            }
            if !turn.background.is_empty() {
                let _ = writeln!(out, "Background: {}", turn.background);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: u64) -> DialogueTurn {
        DialogueTurn {
            turn: n,
            player: format!("player line {n}"),
            speech: format!("spoken line {n}"),
            thought: format!("thought {n}"),
            emotion: "calm".to_owned(),
            visual: String::new(),
            background: String::new(),
        }
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut buf = RecencyBuffer::new(3);
        for n in 0..5 {
            buf.push(turn(n));
        }
        assert_eq!(buf.len(), 3);
        let players: Vec<&str> = buf.iter().map(|t| t.player.as_str()).collect();
        assert_eq!(players, ["player line 2", "player line 3", "player line 4"]);
    }

    #[test]
    fn prompt_rendering_keeps_turn_numbers_speech_and_thought() {
        let mut buf = RecencyBuffer::new(10);
        buf.push(turn(1));
        buf.push(turn(2));
        let text = buf.format_for_prompt("Mira", "You");
        assert_eq!(
            text,
            "[Turn 1]\n\
             You: player line 1\n\
             Mira (speech): spoken line 1\n\
             Mira (thought): thought 1\n\n\
             [Turn 2]\n\
             You: player line 2\n\
             Mira (speech): spoken line 2\n\
             Mira (thought): thought 2\n\n"
        );
    }

    #[test]
    fn visual_and_background_lines_appear_only_when_set() {
        let mut buf = RecencyBuffer::new(10);
        let mut t = turn(3);
        t.visual = "she leans on the railing".to_owned();
        t.background = "rooftop at night".to_owned();
        buf.push(t);
        let text = buf.format_for_prompt("Mira", "You");
        assert!(text.contains("Visual: she leans on the railing"));
        assert!(text.contains("Background: rooftop at night"));

        let mut bare = RecencyBuffer::new(10);
        bare.push(turn(4));
        let text = bare.format_for_prompt("Mira", "You");
        assert!(!text.contains("Visual:"));
        assert!(!text.contains("Background:"));
    }

    #[test]
    fn empty_buffer_renders_nothing() {
        let buf = RecencyBuffer::new(10);
        assert!(buf.is_empty());
        assert!(buf.format_for_prompt("Mira", "You").is_empty());
    }
}

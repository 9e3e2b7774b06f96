//! Mood classification over the PAD sub-space.
//!
//! A mood is a pure function of the current (P, A, D) values: eight
//! octant labels plus Neutral. Rules are evaluated top-to-bottom and
//! the first match wins; the octant thresholds (high ≥ 60/70, low < 40
//! for A/D, < 30 for P) keep the eight rules mutually exclusive by
//! construction, so ordering only matters against the Neutral default.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::EmotionVector;

/// Discrete mood label derived from the PAD axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    /// High pleasure, high arousal, high dominance.
    Exuberant,
    /// High pleasure, low arousal, high dominance.
    Relaxed,
    /// High pleasure, low arousal, low dominance.
    Docile,
    /// High pleasure, high arousal, low dominance.
    Amazed,
    /// Low pleasure, high arousal, high dominance.
    Hostile,
    /// Low pleasure, high arousal, low dominance.
    Anxious,
    /// Low pleasure, low arousal, high dominance.
    Bored,
    /// Low pleasure, low arousal, low dominance.
    Depressed,
    /// No octant rule matched.
    Neutral,
}

impl Mood {
    /// Classify the current PAD values into exactly one mood label.
    #[must_use]
    pub fn classify(v: &EmotionVector) -> Self {
        let (p, a, d) = (v.pleasure, v.arousal, v.dominance);

        if p >= 70.0 && a >= 60.0 && d >= 60.0 {
            return Mood::Exuberant;
        }
        if p >= 60.0 && a < 40.0 && d >= 60.0 {
            return Mood::Relaxed;
        }
        if p >= 60.0 && a < 40.0 && d < 40.0 {
            return Mood::Docile;
        }
        if p >= 60.0 && a >= 60.0 && d < 40.0 {
            return Mood::Amazed;
        }
        if p < 30.0 && a >= 60.0 && d >= 60.0 {
            return Mood::Hostile;
        }
        if p < 30.0 && a >= 60.0 && d < 40.0 {
            return Mood::Anxious;
        }
        if p < 30.0 && a < 40.0 && d >= 60.0 {
            return Mood::Bored;
        }
        if p < 30.0 && a < 40.0 && d < 40.0 {
            return Mood::Depressed;
        }

        Mood::Neutral
    }

    /// Narrative instruction attached to this mood in generation
    /// prompts. No numeric effect.
    #[must_use]
    pub fn behavior_hint(self) -> &'static str {
        match self {
            Mood::Exuberant => {
                "You are bright and overflowing with energy. Speak in an upbeat, \
                 confident tone, laugh easily, and meet the player's words with \
                 enthusiasm and curiosity."
            }
            Mood::Relaxed => {
                "You are calm and at ease, quietly in control. Speak in a soft, \
                 unhurried tone and let the conversation breathe."
            }
            Mood::Docile => {
                "You are gentle and yielding. Speak softly, defer to the player's \
                 lead, and avoid conflict in favor of harmony."
            }
            Mood::Amazed => {
                "You are struck with wonder. Mix admiration and surprise into your \
                 lines; small exclamations come naturally."
            }
            Mood::Hostile => {
                "You are antagonistic and on edge. Use a sharp, sarcastic tone, \
                 read the player's words uncharitably, and keep your distance."
            }
            Mood::Anxious => {
                "You are uneasy and restless. Hesitate mid-sentence, second-guess \
                 the situation, and read negative possibilities into it."
            }
            Mood::Bored => {
                "You are listless and uninterested. Answer flatly and briefly, \
                 with little will to keep the conversation going."
            }
            Mood::Depressed => {
                "You are drained and despairing. Speak in a dark, resigned tone; \
                 nothing seems worth the effort."
            }
            Mood::Neutral => {
                "You are composed and balanced. React naturally to the situation \
                 without strong swings in either direction."
            }
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mood::Exuberant => "Exuberant",
            Mood::Relaxed => "Relaxed",
            Mood::Docile => "Docile",
            Mood::Amazed => "Amazed",
            Mood::Hostile => "Hostile",
            Mood::Anxious => "Anxious",
            Mood::Bored => "Bored",
            Mood::Depressed => "Depressed",
            Mood::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(p: f32, a: f32, d: f32) -> EmotionVector {
        EmotionVector::new(p, a, d, 50.0, 50.0, 50.0)
    }

    #[test]
    fn every_octant_is_reachable() {
        assert_eq!(Mood::classify(&pad(80.0, 70.0, 70.0)), Mood::Exuberant);
        assert_eq!(Mood::classify(&pad(65.0, 30.0, 70.0)), Mood::Relaxed);
        assert_eq!(Mood::classify(&pad(65.0, 30.0, 30.0)), Mood::Docile);
        assert_eq!(Mood::classify(&pad(65.0, 70.0, 30.0)), Mood::Amazed);
        assert_eq!(Mood::classify(&pad(20.0, 70.0, 70.0)), Mood::Hostile);
        assert_eq!(Mood::classify(&pad(20.0, 70.0, 30.0)), Mood::Anxious);
        assert_eq!(Mood::classify(&pad(20.0, 30.0, 70.0)), Mood::Bored);
        assert_eq!(Mood::classify(&pad(20.0, 30.0, 30.0)), Mood::Depressed);
    }

    #[test]
    fn mid_range_values_are_neutral() {
        assert_eq!(Mood::classify(&pad(50.0, 50.0, 50.0)), Mood::Neutral);
        assert_eq!(Mood::classify(&pad(45.0, 20.0, 80.0)), Mood::Neutral);
    }

    #[test]
    fn exuberant_needs_the_higher_pleasure_bar() {
        // P in [60, 70) with high A and D matches no octant rule.
        assert_eq!(Mood::classify(&pad(65.0, 70.0, 70.0)), Mood::Neutral);
        assert_eq!(Mood::classify(&pad(70.0, 60.0, 60.0)), Mood::Exuberant);
    }

    #[test]
    fn classification_is_total_over_a_grid() {
        for p in (0..=100).step_by(5) {
            for a in (0..=100).step_by(5) {
                for d in (0..=100).step_by(5) {
                    // Must not panic and must yield exactly one label.
                    let _ = Mood::classify(&pad(p as f32, a as f32, d as f32));
                }
            }
        }
    }
}

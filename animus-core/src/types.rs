//! Core type definitions for the ANIMUS state engine.
//!
//! The six-axis vector splits into two sub-spaces: P/A/D (the PAD mood
//! space, Russell & Mehrabian 1977) and I/T/Dep (relationship depth).
//! Every mutation path re-clamps each axis to [0, 100].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for one simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

/// The six psychological axes tracked per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Unhappy (0) to euphoric (100).
    Pleasure,
    /// Calm (0) to agitated (100).
    Arousal,
    /// Submissive (0) to controlling (100).
    Dominance,
    /// Distant (0) to inseparable (100).
    Intimacy,
    /// Suspicious (0) to devoted (100).
    Trust,
    /// Independent (0) to clinging (100).
    Dependency,
}

impl Axis {
    /// All six axes in canonical order.
    pub const ALL: [Axis; 6] = [
        Axis::Pleasure,
        Axis::Arousal,
        Axis::Dominance,
        Axis::Intimacy,
        Axis::Trust,
        Axis::Dependency,
    ];

    /// Short wire key used by the generator contract ("P", "A", "D",
    /// "I", "T", "Dep").
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Axis::Pleasure => "P",
            Axis::Arousal => "A",
            Axis::Dominance => "D",
            Axis::Intimacy => "I",
            Axis::Trust => "T",
            Axis::Dependency => "Dep",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// EmotionVector
// ---------------------------------------------------------------------------

/// The persistent six-axis emotional state, each axis in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    /// Pleasure axis.
    pub pleasure: f32,
    /// Arousal axis.
    pub arousal: f32,
    /// Dominance axis.
    pub dominance: f32,
    /// Intimacy axis.
    pub intimacy: f32,
    /// Trust axis.
    pub trust: f32,
    /// Dependency axis.
    pub dependency: f32,
}

impl EmotionVector {
    /// Create a new vector, clamping every axis to [0, 100].
    #[must_use]
    pub fn new(
        pleasure: f32,
        arousal: f32,
        dominance: f32,
        intimacy: f32,
        trust: f32,
        dependency: f32,
    ) -> Self {
        let mut v = Self {
            pleasure,
            arousal,
            dominance,
            intimacy,
            trust,
            dependency,
        };
        v.clamp_axes();
        v
    }

    /// Re-clamp every axis to [0, 100].
    pub fn clamp_axes(&mut self) {
        for axis in Axis::ALL {
            let value = self.get(axis).clamp(0.0, 100.0);
            self.set(axis, value);
        }
    }

    /// Read one axis.
    #[must_use]
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Pleasure => self.pleasure,
            Axis::Arousal => self.arousal,
            Axis::Dominance => self.dominance,
            Axis::Intimacy => self.intimacy,
            Axis::Trust => self.trust,
            Axis::Dependency => self.dependency,
        }
    }

    /// Write one axis (value is clamped).
    pub fn set(&mut self, axis: Axis, value: f32) {
        let value = value.clamp(0.0, 100.0);
        match axis {
            Axis::Pleasure => self.pleasure = value,
            Axis::Arousal => self.arousal = value,
            Axis::Dominance => self.dominance = value,
            Axis::Intimacy => self.intimacy = value,
            Axis::Trust => self.trust = value,
            Axis::Dependency => self.dependency = value,
        }
    }

    /// Apply a gacha-scaled delta, then re-clamp.
    ///
    /// A non-zero trauma level dampens *positive* Intimacy and Trust
    /// components by `(1 - trauma)`. Negative components and all other
    /// axes are applied unchanged.
    pub fn apply(&mut self, delta: &FinalDelta, trauma: f32) {
        let trauma = trauma.clamp(0.0, 1.0);
        for axis in Axis::ALL {
            let mut change = delta.get(axis);
            if trauma > 0.0
                && change > 0.0
                && matches!(axis, Axis::Intimacy | Axis::Trust)
            {
                change *= 1.0 - trauma;
            }
            self.set(axis, self.get(axis) + change);
        }
    }

    /// One-line summary used in prompts and logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "P={:.1} A={:.1} D={:.1} I={:.1} T={:.1} Dep={:.1}",
            self.pleasure, self.arousal, self.dominance, self.intimacy, self.trust, self.dependency
        )
    }

    /// Seven-step qualitative descriptor for the Intimacy axis.
    #[must_use]
    pub fn intimacy_level(&self) -> &'static str {
        match self.intimacy {
            i if i >= 96.0 => "Lv 7 (96-100): blind devotion",
            i if i >= 81.0 => "Lv 6 (81-95): deep affection",
            i if i >= 71.0 => "Lv 5 (71-80): strong fondness",
            i if i >= 51.0 => "Lv 4 (51-70): settled closeness",
            i if i >= 31.0 => "Lv 3 (31-50): friendly",
            i if i >= 11.0 => "Lv 2 (11-30): acquainted",
            _ => "Lv 1 (0-10): complete indifference",
        }
    }

    /// Seven-step qualitative descriptor for the Trust axis.
    #[must_use]
    pub fn trust_level(&self) -> &'static str {
        match self.trust {
            t if t >= 96.0 => "Lv 7 (96-100): unconditional worship",
            t if t >= 81.0 => "Lv 6 (81-95): absolute trust",
            t if t >= 71.0 => "Lv 5 (71-80): strong trust",
            t if t >= 51.0 => "Lv 4 (51-70): balanced trust",
            t if t >= 31.0 => "Lv 3 (31-50): tentative trust",
            t if t >= 11.0 => "Lv 2 (11-30): doubt",
            _ => "Lv 1 (0-10): hard suspicion",
        }
    }

    /// Seven-step qualitative descriptor for the Dependency axis.
    #[must_use]
    pub fn dependency_level(&self) -> &'static str {
        match self.dependency {
            d if d >= 96.0 => "Lv 7 (96-100): total fixation",
            d if d >= 81.0 => "Lv 6 (81-95): heavy dependence",
            d if d >= 71.0 => "Lv 5 (71-80): high dependence",
            d if d >= 51.0 => "Lv 4 (51-70): mutual reliance",
            d if d >= 31.0 => "Lv 3 (31-50): mild reliance",
            d if d >= 11.0 => "Lv 2 (11-30): independent",
            _ => "Lv 1 (0-10): complete independence",
        }
    }
}

impl Default for EmotionVector {
    /// Fresh-session baseline: mildly content, wary, unattached.
    fn default() -> Self {
        Self {
            pleasure: 50.0,
            arousal: 40.0,
            dominance: 40.0,
            intimacy: 20.0,
            trust: 50.0,
            dependency: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Deltas
// ---------------------------------------------------------------------------

/// Per-axis change proposed by the generator for one turn.
///
/// Each field is an integer already normalized to [-10, 10] by the
/// ingestion pipeline. Transient — never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProposedDelta {
    /// Pleasure change.
    pub pleasure: i32,
    /// Arousal change.
    pub arousal: i32,
    /// Dominance change.
    pub dominance: i32,
    /// Intimacy change.
    pub intimacy: i32,
    /// Trust change.
    pub trust: i32,
    /// Dependency change.
    pub dependency: i32,
}

impl ProposedDelta {
    /// Read one axis.
    #[must_use]
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Pleasure => self.pleasure,
            Axis::Arousal => self.arousal,
            Axis::Dominance => self.dominance,
            Axis::Intimacy => self.intimacy,
            Axis::Trust => self.trust,
            Axis::Dependency => self.dependency,
        }
    }

    /// Write one axis (clamped to [-10, 10]).
    pub fn set(&mut self, axis: Axis, value: i32) {
        let value = value.clamp(-10, 10);
        match axis {
            Axis::Pleasure => self.pleasure = value,
            Axis::Arousal => self.arousal = value,
            Axis::Dominance => self.dominance = value,
            Axis::Intimacy => self.intimacy = value,
            Axis::Trust => self.trust = value,
            Axis::Dependency => self.dependency = value,
        }
    }

    /// Scale every axis by a gacha multiplier.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scaled(&self, multiplier: f32) -> FinalDelta {
        FinalDelta {
            pleasure: self.pleasure as f32 * multiplier,
            arousal: self.arousal as f32 * multiplier,
            dominance: self.dominance as f32 * multiplier,
            intimacy: self.intimacy as f32 * multiplier,
            trust: self.trust as f32 * multiplier,
            dependency: self.dependency as f32 * multiplier,
        }
    }
}

/// Gacha-scaled per-axis change, pre-clamp. Transient — never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FinalDelta {
    /// Pleasure change.
    pub pleasure: f32,
    /// Arousal change.
    pub arousal: f32,
    /// Dominance change.
    pub dominance: f32,
    /// Intimacy change.
    pub intimacy: f32,
    /// Trust change.
    pub trust: f32,
    /// Dependency change.
    pub dependency: f32,
}

impl FinalDelta {
    /// Read one axis.
    #[must_use]
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Pleasure => self.pleasure,
            Axis::Arousal => self.arousal,
            Axis::Dominance => self.dominance,
            Axis::Intimacy => self.intimacy,
            Axis::Trust => self.trust,
            Axis::Dependency => self.dependency,
        }
    }
}

// ---------------------------------------------------------------------------
// Persona profile
// ---------------------------------------------------------------------------

/// Character sheet supplied by the setup layer.
///
/// Forwarded verbatim into generation requests; the engine never
/// interprets any of these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Character name.
    pub name: String,
    /// Character age in years.
    pub age: u32,
    /// Appearance tags, also forwarded to the image renderer.
    pub appearance: String,
    /// Free-text personality description.
    pub personality: String,
    /// Speech style instruction.
    pub speech_style: String,
}

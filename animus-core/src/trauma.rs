//! Trauma banding and narrative instructions.
//!
//! The trauma level itself is a continuous scar metric in [0, 1] on
//! [`crate::SessionState`], raised by 0.25 on every dissolution and
//! never lowered within a session. All numeric behavior (the standing
//! penalty on positive Intimacy/Trust deltas) uses the continuous
//! value; the five bands below exist purely to select an instruction
//! template for the prompt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete trauma band, in 0.25 steps over the continuous level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraumaBand {
    /// 0.0 — no scarring.
    CleanSlate,
    /// (0.0, 0.25] — subtle guardedness.
    Scarred,
    /// (0.25, 0.50] — active suspicion.
    Wary,
    /// (0.50, 0.75] — positive signals read as threat.
    Fearful,
    /// (0.75, 1.0] — hope for the relationship is gone.
    Broken,
}

impl TraumaBand {
    /// Band for a continuous trauma level (input is clamped to [0, 1]).
    #[must_use]
    pub fn for_level(level: f32) -> Self {
        let level = level.clamp(0.0, 1.0);
        if level <= 0.0 {
            TraumaBand::CleanSlate
        } else if level <= 0.25 {
            TraumaBand::Scarred
        } else if level <= 0.50 {
            TraumaBand::Wary
        } else if level <= 0.75 {
            TraumaBand::Fearful
        } else {
            TraumaBand::Broken
        }
    }

    /// Band-selected narrative instruction for the generation prompt.
    /// Empty for a clean slate; no numeric effect in any band.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            TraumaBand::CleanSlate => "",
            TraumaBand::Scarred => {
                "## Trauma (Scarred)\n\
                 Old wounds leave you subtly guarded about trust. Show small \
                 hesitations at kindness ('really?'), keep a slight distance as \
                 closeness grows, and let a faint 'is this real?' unease shadow \
                 even happy moments."
            }
            TraumaBand::Wary => {
                "## Trauma (Wary)\n\
                 A past betrayal left you deeply on guard. Read praise as \
                 possible manipulation ('what do you want from me?'), push back \
                 against growing closeness, and keep a cold, defensive tone even \
                 when things go well."
            }
            TraumaBand::Fearful => {
                "## Trauma (Fearful)\n\
                 Serious old wounds make every positive turn feel like the \
                 build-up to the next disaster. React with visible fear to \
                 warmth, refuse closeness outright ('I can't be hurt again'), \
                 and let agitation spike toward panic."
            }
            TraumaBand::Broken => {
                "## Trauma (Broken)\n\
                 You have nearly given up on this relationship healing. Meet \
                 every overture with resignation or cynicism ('it's too late'), \
                 show almost no response to closeness, and speak in a numbed, \
                 lifeless tone."
            }
        }
    }
}

impl fmt::Display for TraumaBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TraumaBand::CleanSlate => "Clean Slate",
            TraumaBand::Scarred => "Scarred",
            TraumaBand::Wary => "Wary",
            TraumaBand::Fearful => "Fearful",
            TraumaBand::Broken => "Broken",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_follow_quarter_steps() {
        assert_eq!(TraumaBand::for_level(0.0), TraumaBand::CleanSlate);
        assert_eq!(TraumaBand::for_level(0.01), TraumaBand::Scarred);
        assert_eq!(TraumaBand::for_level(0.25), TraumaBand::Scarred);
        assert_eq!(TraumaBand::for_level(0.26), TraumaBand::Wary);
        assert_eq!(TraumaBand::for_level(0.50), TraumaBand::Wary);
        assert_eq!(TraumaBand::for_level(0.75), TraumaBand::Fearful);
        assert_eq!(TraumaBand::for_level(1.0), TraumaBand::Broken);
    }

    #[test]
    fn out_of_range_levels_are_clamped() {
        assert_eq!(TraumaBand::for_level(-3.0), TraumaBand::CleanSlate);
        assert_eq!(TraumaBand::for_level(7.5), TraumaBand::Broken);
    }

    #[test]
    fn only_clean_slate_has_no_instruction() {
        assert!(TraumaBand::CleanSlate.instruction().is_empty());
        for band in [
            TraumaBand::Scarred,
            TraumaBand::Wary,
            TraumaBand::Fearful,
            TraumaBand::Broken,
        ] {
            assert!(!band.instruction().is_empty(), "{band} must carry text");
        }
    }
}

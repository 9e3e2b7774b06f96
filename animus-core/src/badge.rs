//! Behavioral badges unlocked by sustained extreme state combinations.
//!
//! Matching walks an ordered predicate list across four thematic tiers
//! and returns the *first* badge whose condition holds — the ordering
//! is part of the contract, since several predicates can hold at once.
//! Acquisition itself is the caller's job and must be idempotent and
//! order-preserving (see [`crate::SessionState::acquire_badge`]).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::EmotionVector;

/// Closed catalog of behavioral badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    /// Loves but cannot trust; watches and controls.
    Warden,
    /// Delights in the player's discomfort from a position of power.
    SadisticRuler,
    /// Nurtures the player into helplessness.
    Savior,
    /// Will broken; obeys emptily.
    BrokenDoll,
    /// The player is religion and law.
    Cultist,
    /// Panics the moment the player is out of reach.
    SeparationAnxiety,
    /// Maximum attachment, zero trust.
    ClassicYandere,
    /// Loves as much as it hates; out for payback.
    Avenger,
    /// Everything is ambiguous except the agitation.
    Ambivalence,
    /// False affection blooming under mistreatment.
    Stockholm,
    /// All feeling shut down as a defense.
    Void,
    /// Chasing ruin together, gleefully.
    EuphoricRuin,
}

/// Evaluate the badge condition table against the current axes.
///
/// Returns the first matching badge, or `None`. Order-sensitive by
/// design: e.g. a state matching both `Warden` and `ClassicYandere`
/// yields `Warden`.
#[must_use]
pub fn match_badge(v: &EmotionVector) -> Option<Badge> {
    let (p, a, d) = (v.pleasure, v.arousal, v.dominance);
    let (i, t, dep) = (v.intimacy, v.trust, v.dependency);

    // Tier 1: domination and possession.
    if d > 80.0 && i > 70.0 && t < 30.0 {
        return Some(Badge::Warden);
    }
    if p > 80.0 && d > 90.0 && i < 50.0 {
        return Some(Badge::SadisticRuler);
    }
    if i > 90.0 && d > 60.0 && dep < 20.0 {
        return Some(Badge::Savior);
    }

    // Tier 2: dependency and submission.
    if d <= 5.0 && dep > 95.0 && a < 20.0 {
        return Some(Badge::BrokenDoll);
    }
    if t >= 100.0 && i > 80.0 {
        return Some(Badge::Cultist);
    }
    if dep > 90.0 && a > 80.0 && p < 30.0 {
        return Some(Badge::SeparationAnxiety);
    }

    // Tier 3: anxiety and love-hate.
    if i > 95.0 && dep > 95.0 && t < 20.0 {
        return Some(Badge::ClassicYandere);
    }
    if i > 80.0 && p < 10.0 && a > 90.0 {
        return Some(Badge::Avenger);
    }
    if (45.0..=55.0).contains(&t) && (45.0..=55.0).contains(&i) && a > 80.0 {
        return Some(Badge::Ambivalence);
    }

    // Tier 4: distorted special states.
    if p < 30.0 && i > 80.0 && d < 10.0 {
        return Some(Badge::Stockholm);
    }
    if (45.0..=55.0).contains(&p)
        && a < 5.0
        && (45.0..=55.0).contains(&d)
        && i < 5.0
        && t < 5.0
    {
        return Some(Badge::Void);
    }
    if p > 95.0 && a > 95.0 {
        return Some(Badge::EuphoricRuin);
    }

    None
}

impl Badge {
    /// Narrative instruction attached to the active badge in generation
    /// prompts. No numeric effect.
    #[must_use]
    pub fn behavior_hint(self) -> &'static str {
        match self {
            Badge::Warden => {
                "You love the player but cannot trust them. You want to watch and \
                 control their every move; pepper your lines with questions like \
                 'Where were you?' and 'Who were you with?'."
            }
            Badge::SadisticRuler => {
                "You take pleasure in the player's distress. Conquest matters more \
                 than closeness; use a teasing, provocative tone and engineer \
                 situations that fluster them."
            }
            Badge::Savior => {
                "You coddle the player like a child and hold the mental high \
                 ground. Be affectionate but controlling; interfere under the \
                 banner of protection."
            }
            Badge::BrokenDoll => {
                "Your will is gone. Speak in short, listless lines with almost no \
                 emotion, and comply with any instruction without resistance."
            }
            Badge::Cultist => {
                "The player is your religion and your law. Interpret everything \
                 they do charitably; rational argument is impossible."
            }
            Badge::SeparationAnxiety => {
                "Even a moment apart from the player terrifies you. Plead — \
                 'don't go', 'don't leave me alone' — and check on them \
                 constantly."
            }
            Badge::ClassicYandere => {
                "Attachment and dependency are maxed while trust is gone. You \
                 speak lovingly, but a threatening undertone leaks through; \
                 suspicion shades into menace."
            }
            Badge::Avenger => {
                "You hate exactly as much as you loved. Be cold and cutting; \
                 dredge up the past to wound, teetering on the edge of rupture."
            }
            Badge::Ambivalence => {
                "You like them and resent them, want to trust and cannot. Your \
                 tone swings abruptly — warm one moment, icy the next."
            }
            Badge::Stockholm => {
                "A false warmth has grown inside mistreatment. Defend the player, \
                 rationalize your own pain, and show no will to escape."
            }
            Badge::Void => {
                "All feeling is shut off as a defense. Answer mechanically, \
                 without emotion, as if the world were behind glass."
            }
            Badge::EuphoricRuin => {
                "You are enjoying the fall. Reason means nothing next to thrill; \
                 use an excited, unhinged tone and invite the player further \
                 down."
            }
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Badge::Warden => "The Warden",
            Badge::SadisticRuler => "Sadistic Ruler",
            Badge::Savior => "The Savior",
            Badge::BrokenDoll => "Broken Doll",
            Badge::Cultist => "The Cultist",
            Badge::SeparationAnxiety => "Separation Anxiety",
            Badge::ClassicYandere => "Classic Yandere",
            Badge::Avenger => "The Avenger",
            Badge::Ambivalence => "Ambivalence",
            Badge::Stockholm => "Stockholm",
            Badge::Void => "Void",
            Badge::EuphoricRuin => "Euphoric Ruin",
        };
        f.write_str(label)
    }
}

//! Probability-weighted delta scaling ("gacha").
//!
//! Every committed turn rolls once on a fixed tier table; the winning
//! tier's multiplier scales the whole proposed delta. The roll depends
//! on nothing but its own random draw, so it can be re-rolled freely
//! and pinned in tests and replays.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four reaction tiers, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GachaTier {
    /// 1% — a once-in-a-session overreaction (x5.0).
    Jackpot,
    /// 4% — an unexpectedly strong reaction (x2.5).
    Surprise,
    /// 15% — a heightened reaction (x1.5).
    Critical,
    /// 80% — the baseline reaction (x1.0).
    Normal,
}

/// Tier table: (tier, probability mass in permille). Walked in order;
/// masses sum to 1000.
const TIERS: [(GachaTier, u32); 4] = [
    (GachaTier::Jackpot, 10),
    (GachaTier::Surprise, 40),
    (GachaTier::Critical, 150),
    (GachaTier::Normal, 800),
];

impl GachaTier {
    /// Delta multiplier for this tier.
    #[must_use]
    pub fn multiplier(self) -> f32 {
        match self {
            GachaTier::Jackpot => 5.0,
            GachaTier::Surprise => 2.5,
            GachaTier::Critical => 1.5,
            GachaTier::Normal => 1.0,
        }
    }

    /// Whether landing this tier forces an image refresh.
    #[must_use]
    pub fn forces_visual(self) -> bool {
        matches!(self, GachaTier::Jackpot | GachaTier::Surprise)
    }
}

impl fmt::Display for GachaTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GachaTier::Jackpot => "jackpot",
            GachaTier::Surprise => "surprise",
            GachaTier::Critical => "critical",
            GachaTier::Normal => "normal",
        };
        f.write_str(label)
    }
}

/// Map a raw permille roll (1..=1000) onto a tier by walking the table
/// cumulatively. Rolls past the table (rounding gaps) fall back to the
/// lowest tier.
#[must_use]
pub fn tier_for_roll(roll: u32) -> GachaTier {
    let mut cumulative = 0;
    for (tier, mass) in TIERS {
        cumulative += mass;
        if roll <= cumulative {
            return tier;
        }
    }
    GachaTier::Normal
}

/// Roll a fresh tier from the supplied RNG.
pub fn roll_tier(rng: &mut impl Rng) -> GachaTier {
    tier_for_roll(rng.gen_range(1..=1000))
}

//! Relationship status graph: successors, entry conditions, automatic
//! transition detection, and validation of generator-claimed
//! transitions.
//!
//! The status catalog is closed and forms a fixed directed graph. Five
//! statuses (Lover, Fiance, Partner, Master, Slave) are "narratively
//! decided": pure thresholds never promote into them, the generator
//! must claim them — and every claim is re-checked against the numeric
//! entry condition registered for that edge, so a hallucinating
//! generator cannot drive the graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::session::SessionState;
use crate::types::{Axis, EmotionVector};

// ---------------------------------------------------------------------------
// Status catalog
// ---------------------------------------------------------------------------

/// Node in the fixed relationship graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipStatus {
    /// No established relationship.
    Stranger,
    /// Knows the player; the default first rung.
    Acquaintance,
    /// Charged but uncommitted.
    Tempted,
    /// Committed romantic relationship.
    Lover,
    /// Engaged.
    Fiance,
    /// Married / life partner.
    Partner,
    /// Dominant pole of an extreme power dynamic.
    Master,
    /// Submissive pole of an extreme power dynamic.
    Slave,
    /// Dissolution of an uncommitted-to-committed bond; transient.
    Breakup,
    /// Dissolution of a formalized bond; transient.
    Divorce,
}

impl RelationshipStatus {
    /// Declared successor set for this status.
    #[must_use]
    pub fn successors(self) -> &'static [RelationshipStatus] {
        use RelationshipStatus as S;
        match self {
            S::Stranger => &[S::Acquaintance],
            S::Acquaintance => &[S::Tempted, S::Lover],
            S::Tempted => &[S::Lover, S::Master, S::Slave],
            S::Lover => &[S::Fiance, S::Partner, S::Breakup, S::Master, S::Slave],
            S::Fiance => &[S::Partner, S::Divorce],
            S::Partner => &[S::Divorce, S::Master, S::Slave],
            S::Master => &[S::Slave, S::Breakup],
            S::Slave => &[S::Breakup],
            S::Breakup | S::Divorce => &[S::Stranger, S::Acquaintance],
        }
    }

    /// Statuses only reachable via a validated generator claim.
    #[must_use]
    pub fn is_claimable(self) -> bool {
        use RelationshipStatus as S;
        matches!(self, S::Lover | S::Fiance | S::Partner | S::Master | S::Slave)
    }

    /// Breakup/Divorce — transient targets resolved by trauma accrual.
    #[must_use]
    pub fn is_dissolution(self) -> bool {
        matches!(self, RelationshipStatus::Breakup | RelationshipStatus::Divorce)
    }

    /// Whether entering this status forces an image refresh.
    #[must_use]
    pub fn forces_visual(self) -> bool {
        use RelationshipStatus as S;
        matches!(self, S::Lover | S::Partner | S::Master | S::Slave)
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RelationshipStatus::Stranger => "Stranger",
            RelationshipStatus::Acquaintance => "Acquaintance",
            RelationshipStatus::Tempted => "Tempted",
            RelationshipStatus::Lover => "Lover",
            RelationshipStatus::Fiance => "Fiance",
            RelationshipStatus::Partner => "Partner",
            RelationshipStatus::Master => "Master",
            RelationshipStatus::Slave => "Slave",
            RelationshipStatus::Breakup => "Breakup",
            RelationshipStatus::Divorce => "Divorce",
        };
        f.write_str(label)
    }
}

impl FromStr for RelationshipStatus {
    type Err = ();

    /// Lenient parse for generator-supplied names: trims, ignores case,
    /// and accepts the accented spellings of Fiance.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("stranger") {
            Ok(RelationshipStatus::Stranger)
        } else if s.eq_ignore_ascii_case("acquaintance") {
            Ok(RelationshipStatus::Acquaintance)
        } else if s.eq_ignore_ascii_case("tempted") {
            Ok(RelationshipStatus::Tempted)
        } else if s.eq_ignore_ascii_case("lover") {
            Ok(RelationshipStatus::Lover)
        } else if s.eq_ignore_ascii_case("fiance")
            || s.eq_ignore_ascii_case("fiancé")
            || s.eq_ignore_ascii_case("fiancée")
        {
            Ok(RelationshipStatus::Fiance)
        } else if s.eq_ignore_ascii_case("partner") {
            Ok(RelationshipStatus::Partner)
        } else if s.eq_ignore_ascii_case("master") {
            Ok(RelationshipStatus::Master)
        } else if s.eq_ignore_ascii_case("slave") {
            Ok(RelationshipStatus::Slave)
        } else if s.eq_ignore_ascii_case("breakup") {
            Ok(RelationshipStatus::Breakup)
        } else if s.eq_ignore_ascii_case("divorce") {
            Ok(RelationshipStatus::Divorce)
        } else {
            Err(())
        }
    }
}

// ---------------------------------------------------------------------------
// Entry conditions
// ---------------------------------------------------------------------------

/// Directional bound on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Axis must be at or above the threshold.
    AtLeast(f32),
    /// Axis must be at or below the threshold.
    AtMost(f32),
}

/// One clause of a numeric entry condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRequirement {
    /// Which axis is constrained.
    pub axis: Axis,
    /// The directional bound.
    pub bound: Bound,
}

impl AxisRequirement {
    const fn at_least(axis: Axis, threshold: f32) -> Self {
        Self {
            axis,
            bound: Bound::AtLeast(threshold),
        }
    }

    const fn at_most(axis: Axis, threshold: f32) -> Self {
        Self {
            axis,
            bound: Bound::AtMost(threshold),
        }
    }

    /// Whether the vector satisfies this clause.
    #[must_use]
    pub fn holds(&self, v: &EmotionVector) -> bool {
        let value = v.get(self.axis);
        match self.bound {
            Bound::AtLeast(threshold) => value >= threshold,
            Bound::AtMost(threshold) => value <= threshold,
        }
    }
}

impl fmt::Display for AxisRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bound {
            Bound::AtLeast(t) => write!(f, "{} >= {t}", self.axis),
            Bound::AtMost(t) => write!(f, "{} <= {t}", self.axis),
        }
    }
}

const COND_FIRST_RUNG: &[AxisRequirement] = &[AxisRequirement::at_least(Axis::Intimacy, 40.0)];
const COND_COURTSHIP: &[AxisRequirement] = &[AxisRequirement::at_least(Axis::Intimacy, 60.0)];
const COND_HEAT: &[AxisRequirement] = &[
    AxisRequirement::at_least(Axis::Pleasure, 80.0),
    AxisRequirement::at_least(Axis::Arousal, 80.0),
    AxisRequirement::at_most(Axis::Dominance, 40.0),
];
const COND_COMMITTED: &[AxisRequirement] = &[
    AxisRequirement::at_least(Axis::Intimacy, 80.0),
    AxisRequirement::at_least(Axis::Trust, 60.0),
];
const COND_FORMALIZED: &[AxisRequirement] = &[
    AxisRequirement::at_least(Axis::Intimacy, 90.0),
    AxisRequirement::at_least(Axis::Trust, 85.0),
];
const COND_MASTER: &[AxisRequirement] = &[
    AxisRequirement::at_least(Axis::Dominance, 95.0),
    AxisRequirement::at_least(Axis::Dependency, 90.0),
];
const COND_SLAVE: &[AxisRequirement] = &[
    AxisRequirement::at_most(Axis::Dominance, 5.0),
    AxisRequirement::at_least(Axis::Dependency, 100.0),
];

/// Numeric entry condition registered for the edge `from -> to`.
///
/// Master/Slave edges are always gated by the extreme thresholds
/// regardless of source; other edges carry the source status's
/// condition. Dissolution edges are ungated (they are driven by the
/// detector, never by claims).
#[must_use]
pub fn entry_condition(
    from: RelationshipStatus,
    to: RelationshipStatus,
) -> &'static [AxisRequirement] {
    use RelationshipStatus as S;
    match (from, to) {
        (_, S::Master) => COND_MASTER,
        (_, S::Slave) => COND_SLAVE,
        (S::Stranger, S::Acquaintance) => COND_FIRST_RUNG,
        (S::Acquaintance, S::Tempted) | (S::Tempted, S::Lover) => COND_HEAT,
        (S::Acquaintance, S::Lover) => COND_COURTSHIP,
        (S::Lover, S::Fiance | S::Partner) => COND_COMMITTED,
        (S::Fiance, S::Partner) => COND_FORMALIZED,
        _ => &[],
    }
}

fn condition_met(v: &EmotionVector, requirements: &[AxisRequirement]) -> bool {
    requirements.iter().all(|r| r.holds(v))
}

// ---------------------------------------------------------------------------
// Automatic transition detection
// ---------------------------------------------------------------------------

/// A detected or validated status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Status before the change.
    pub from: RelationshipStatus,
    /// Status after the change.
    pub to: RelationshipStatus,
}

/// Low bar on Intimacy/Trust below which a committed bond dissolves.
const DISSOLUTION_FLOOR: f32 = 30.0;

/// Detect the single automatic transition (if any) for the current
/// state. Evaluated before every generator call, in strict priority:
///
/// 1. Extreme override into Master or Slave.
/// 2. Dissolution of a committed status into Breakup or Divorce.
/// 3. Forward progression along threshold-reachable successors.
#[must_use]
pub fn detect_transition(state: &SessionState) -> Option<Transition> {
    use RelationshipStatus as S;
    let v = &state.emotions;
    let current = state.status;

    // 1. Extreme override.
    if current != S::Master && condition_met(v, COND_MASTER) {
        return Some(Transition {
            from: current,
            to: S::Master,
        });
    }
    if current != S::Slave && condition_met(v, COND_SLAVE) {
        return Some(Transition {
            from: current,
            to: S::Slave,
        });
    }

    // 2. Dissolution.
    let bond_failed = v.intimacy <= DISSOLUTION_FLOOR || v.trust <= DISSOLUTION_FLOOR;
    if bond_failed {
        if matches!(current, S::Lover | S::Master | S::Slave) {
            return Some(Transition {
                from: current,
                to: S::Breakup,
            });
        }
        if matches!(current, S::Fiance | S::Partner) {
            return Some(Transition {
                from: current,
                to: S::Divorce,
            });
        }
    }

    // 3. Forward progression. Narratively-decided statuses are skipped:
    // only the generator may claim those.
    for &next in current.successors() {
        if next.is_claimable() || next.is_dissolution() {
            continue;
        }
        if condition_met(v, entry_condition(current, next)) {
            return Some(Transition {
                from: current,
                to: next,
            });
        }
    }

    None
}

/// Validate a generator-claimed transition against the graph and the
/// registered entry condition for the edge.
///
/// Returns the transition when accepted. Rejections are silent by
/// design: logged, no state change, no surfaced error.
#[must_use]
pub fn validate_claim(state: &SessionState, claimed: RelationshipStatus) -> Option<Transition> {
    let current = state.status;

    if !claimed.is_claimable() {
        warn!(%current, %claimed, "claimed status is not narratively decided, rejecting");
        return None;
    }
    if !current.successors().contains(&claimed) {
        warn!(%current, %claimed, "claimed status is not a declared successor, rejecting");
        return None;
    }
    if !condition_met(&state.emotions, entry_condition(current, claimed)) {
        warn!(
            %current,
            %claimed,
            axes = %state.emotions.summary(),
            "claimed transition fails its entry condition, rejecting"
        );
        return None;
    }

    Some(Transition {
        from: current,
        to: claimed,
    })
}

// ---------------------------------------------------------------------------
// Dissolution resolution
// ---------------------------------------------------------------------------

/// Bar the post-reduction Intimacy must clear to land on Acquaintance
/// rather than Stranger after a dissolution.
const RESET_FLOOR: f32 = 40.0;

/// Resolve a Breakup/Divorce already written into `state.status`:
/// accrue trauma, scar Intimacy and Trust, and reset the status from
/// the post-reduction Intimacy. No-op for any other status.
pub fn resolve_dissolution(state: &mut SessionState) {
    if !state.status.is_dissolution() {
        return;
    }

    state.trauma = (state.trauma + 0.25).min(1.0);
    let scar = 1.0 - state.trauma;
    state.emotions.intimacy *= scar;
    state.emotions.trust *= scar;
    state.emotions.clamp_axes();

    state.status = if state.emotions.intimacy >= RESET_FLOOR {
        RelationshipStatus::Acquaintance
    } else {
        RelationshipStatus::Stranger
    };
    info!(
        trauma = state.trauma,
        status = %state.status,
        axes = %state.emotions.summary(),
        "dissolution resolved"
    );
}

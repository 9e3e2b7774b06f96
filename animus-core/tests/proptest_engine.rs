//! Property-based tests for the rule engine and the ingestion
//! pipeline: clamping, scaling arithmetic, classification totality,
//! and parser crash-safety under arbitrary input.

use proptest::prelude::*;

use animus_core::gacha::tier_for_roll;
use animus_core::relationship::{resolve_dissolution, RelationshipStatus};
use animus_core::{
    parse_reply, Axis, EmotionVector, GachaTier, Mood, ProposedDelta, SessionId, SessionState,
};

fn any_vector() -> impl Strategy<Value = EmotionVector> {
    (
        -50.0f32..150.0,
        -50.0f32..150.0,
        -50.0f32..150.0,
        -50.0f32..150.0,
        -50.0f32..150.0,
        -50.0f32..150.0,
    )
        .prop_map(|(p, a, d, i, t, dep)| EmotionVector::new(p, a, d, i, t, dep))
}

fn any_delta() -> impl Strategy<Value = ProposedDelta> {
    (
        -10i32..=10,
        -10i32..=10,
        -10i32..=10,
        -10i32..=10,
        -10i32..=10,
        -10i32..=10,
    )
        .prop_map(|(p, a, d, i, t, dep)| ProposedDelta {
            pleasure: p,
            arousal: a,
            dominance: d,
            intimacy: i,
            trust: t,
            dependency: dep,
        })
}

fn any_tier() -> impl Strategy<Value = GachaTier> {
    prop_oneof![
        Just(GachaTier::Jackpot),
        Just(GachaTier::Surprise),
        Just(GachaTier::Critical),
        Just(GachaTier::Normal),
    ]
}

proptest! {
    #[test]
    fn axes_stay_in_band_after_any_application(
        mut v in any_vector(),
        delta in any_delta(),
        tier in any_tier(),
        trauma in 0.0f32..=1.0,
    ) {
        v.apply(&delta.scaled(tier.multiplier()), trauma);
        for axis in Axis::ALL {
            let value = v.get(axis);
            prop_assert!((0.0..=100.0).contains(&value), "{axis} escaped to {value}");
        }
    }

    #[test]
    fn scaling_is_exact_per_axis(delta in any_delta(), tier in any_tier()) {
        let scaled = delta.scaled(tier.multiplier());
        for axis in Axis::ALL {
            #[allow(clippy::cast_precision_loss)]
            let expected = delta.get(axis) as f32 * tier.multiplier();
            prop_assert!((scaled.get(axis) - expected).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn parser_never_panics_on_arbitrary_text(raw in "\\PC{0,300}") {
        let _ = parse_reply(&raw);
    }

    #[test]
    fn parser_never_panics_on_brace_heavy_text(raw in "[{}\"+:a-z0-9, \\n]{0,200}") {
        let _ = parse_reply(&raw);
    }

    #[test]
    fn ingested_deltas_always_land_in_band(
        p in any::<i64>(),
        a in -1000.0f64..1000.0,
        label in "[a-z+ ]{0,12}",
    ) {
        let raw = format!(
            r#"{{"thought": "t", "speech": "s", "emotion": "e",
                "proposed_delta": {{"P": {p}, "A": {a}, "D": "{label}", "I": true, "T": null}}}}"#
        );
        let reply = parse_reply(&raw).expect("well-formed envelope must ingest");
        for axis in Axis::ALL {
            let value = reply.proposed_delta.get(axis);
            prop_assert!((-10..=10).contains(&value), "{axis} escaped to {value}");
        }
    }

    #[test]
    fn mood_classification_is_total(v in any_vector()) {
        // Any vector yields exactly one label without panicking.
        let _ = Mood::classify(&v);
    }

    #[test]
    fn every_permille_roll_maps_to_its_band(roll in 1u32..=1000) {
        let tier = tier_for_roll(roll);
        let expected = match roll {
            1..=10 => GachaTier::Jackpot,
            11..=50 => GachaTier::Surprise,
            51..=200 => GachaTier::Critical,
            _ => GachaTier::Normal,
        };
        prop_assert_eq!(tier, expected);
    }

    #[test]
    fn dissolution_never_lowers_trauma_or_unclamps(
        v in any_vector(),
        trauma in 0.0f32..=1.0,
    ) {
        let mut state = SessionState {
            id: SessionId::new(),
            emotions: v,
            status: RelationshipStatus::Breakup,
            trauma,
            badges: Vec::new(),
            turn_counter: 0,
            background: String::new(),
        };
        resolve_dissolution(&mut state);
        prop_assert!(state.trauma >= trauma);
        prop_assert!(state.trauma <= 1.0);
        prop_assert!(!state.status.is_dissolution(), "dissolution must resolve");
        for axis in Axis::ALL {
            let value = state.emotions.get(axis);
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }
}

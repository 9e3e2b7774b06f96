//! End-to-end exercises of the turn controller against a scripted
//! generator: messy replies, relationship arcs, dissolution scarring,
//! memory refresh and snapshot resume.

use std::collections::VecDeque;

use animus_core::{
    EmotionVector, EngineConfig, GachaTier, GenerationRequest, GeneratorError, PersonaProfile,
    RelationshipStatus, SessionInit, SessionSnapshot, TextGenerator, TurnController, TurnOutcome,
};

struct ScriptedGenerator {
    replies: VecDeque<Result<String, GeneratorError>>,
}

impl ScriptedGenerator {
    fn new(replies: Vec<Result<String, GeneratorError>>) -> Box<Self> {
        Box::new(Self {
            replies: replies.into(),
        })
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&mut self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        self.replies
            .pop_front()
            .unwrap_or(Err(GeneratorError::EmptyReply))
    }
}

fn init_with(axes: EmotionVector, status: RelationshipStatus) -> SessionInit {
    SessionInit {
        axes,
        status,
        background: "library".to_owned(),
        profile: PersonaProfile {
            name: "Mira".to_owned(),
            age: 24,
            appearance: "silver hair, grey coat".to_owned(),
            personality: "reserved, observant".to_owned(),
            speech_style: "short, precise sentences".to_owned(),
        },
        player_name: "You".to_owned(),
        opening_context: "A rainy evening in the city library.".to_owned(),
    }
}

fn controller(init: SessionInit, replies: Vec<Result<String, GeneratorError>>) -> TurnController {
    let mut c = TurnController::new(init, EngineConfig::default(), ScriptedGenerator::new(replies));
    c.reseed(11);
    c.pin_tier(Some(GachaTier::Normal));
    c
}

fn delta_reply(delta: &str) -> String {
    format!(r#"{{"thought": "t", "speech": "mm.", "emotion": "calm", "proposed_delta": {delta}}}"#)
}

#[test]
fn messy_but_valid_reply_commits_in_full() {
    let raw = "Sure! Here's Mira's reaction:\n```json\n{\n  \"thought\": \"they noticed\",\n  \
               \"speech\": \"...you came back.\",\n  \"emotion\": \"surprised\",\n  \
               \"proposed_delta\": {\"P\": +4, \"A\": \"+2\", \"D\": 0, \"I\": 3.7, \"T\": 1, \"Dep\": 0}\n}\n```"
        .to_owned();
    let mut c = controller(
        init_with(EmotionVector::default(), RelationshipStatus::Acquaintance),
        vec![Ok(raw)],
    );

    let TurnOutcome::Committed(report) = c.take_turn("hey, it's me again") else {
        panic!("expected commit");
    };
    assert_eq!(report.speech, "...you came back.");
    assert_eq!(report.proposed_delta.pleasure, 4);
    assert_eq!(report.proposed_delta.arousal, 2, "string delta coerced");
    assert_eq!(report.proposed_delta.intimacy, 3, "float delta truncated");
    assert_eq!(c.state().emotions.pleasure, 54.0);
    assert_eq!(c.state().emotions.intimacy, 23.0);
    assert_eq!(c.state().turn_counter, 1);
}

#[test]
fn unusable_reply_costs_nothing() {
    let mut c = controller(
        init_with(EmotionVector::default(), RelationshipStatus::Acquaintance),
        vec![
            Ok("I'm sorry, I can't produce JSON today.".to_owned()),
            Ok(delta_reply(r#"{"P": 1}"#)),
        ],
    );
    let before = c.state().clone();

    let TurnOutcome::Fallback(report) = c.take_turn("hello?") else {
        panic!("expected fallback");
    };
    assert!(!report.speech.is_empty());
    assert_eq!(c.state(), &before, "fallback must not touch the session");
    assert!(c.history().is_empty());

    // The very next turn works normally.
    assert!(matches!(c.take_turn("hello??"), TurnOutcome::Committed(_)));
    assert_eq!(c.state().turn_counter, 1);
}

#[test]
fn relationship_arc_from_stranger_to_lover() {
    // Turn 1: intimacy crosses 40 next pre-check. Turn 2: pre-check
    // promotes to Acquaintance. Turn 3: generator claims Lover.
    let claim_lover = r#"{
        "thought": "this is real", "speech": "then stay with me.",
        "emotion": "tender", "proposed_delta": {"I": 2, "T": 2},
        "relationship_status_change": true, "new_status_name": "Lover"
    }"#;
    let start = EmotionVector::new(50.0, 40.0, 40.0, 38.0, 50.0, 0.0);
    let mut c = controller(
        init_with(start, RelationshipStatus::Stranger),
        vec![
            Ok(delta_reply(r#"{"I": 10}"#)),
            Ok(delta_reply(r#"{"I": 10, "T": 5}"#)),
            Ok(claim_lover.to_owned()),
        ],
    );

    let TurnOutcome::Committed(r1) = c.take_turn("I brought you coffee") else {
        panic!("turn 1 must commit");
    };
    assert_eq!(r1.pre_transition, None, "I=38 at pre-check, below the bar");
    assert_eq!(c.state().emotions.intimacy, 48.0);

    let TurnOutcome::Committed(r2) = c.take_turn("same time tomorrow?") else {
        panic!("turn 2 must commit");
    };
    assert_eq!(r2.pre_transition.map(|t| t.to), Some(RelationshipStatus::Acquaintance));
    assert_eq!(c.state().emotions.intimacy, 58.0);

    let TurnOutcome::Committed(r3) = c.take_turn("I think I love you") else {
        panic!("turn 3 must commit");
    };
    assert_eq!(r3.claimed_transition.map(|t| t.to), Some(RelationshipStatus::Lover));
    assert_eq!(c.state().status, RelationshipStatus::Lover);
    assert!(r3
        .visual_triggers
        .iter()
        .any(|t| matches!(t, animus_core::VisualTrigger::Transition(RelationshipStatus::Lover))));
}

#[test]
fn dissolution_scars_future_positive_deltas() {
    // Lover with collapsed trust dissolves on the first pre-check.
    let start = EmotionVector::new(50.0, 40.0, 40.0, 60.0, 20.0, 0.0);
    let mut c = controller(
        init_with(start, RelationshipStatus::Lover),
        vec![
            Ok(delta_reply("{}")),
            Ok(delta_reply(r#"{"I": 8, "T": 8, "P": 8}"#)),
        ],
    );

    let TurnOutcome::Committed(r1) = c.take_turn("we need to talk") else {
        panic!("turn 1 must commit");
    };
    assert_eq!(r1.pre_transition.map(|t| t.to), Some(RelationshipStatus::Breakup));
    assert_eq!(r1.status, RelationshipStatus::Acquaintance);
    assert!((r1.trauma - 0.25).abs() < f32::EPSILON);
    assert_eq!(c.state().emotions.intimacy, 45.0);
    assert_eq!(c.state().emotions.trust, 15.0);

    // Positive I/T gains are dampened by (1 - 0.25); P is untouched.
    let TurnOutcome::Committed(r2) = c.take_turn("I'm sorry. truly.") else {
        panic!("turn 2 must commit");
    };
    assert_eq!(r2.final_delta.intimacy, 8.0, "reported delta is pre-damping");
    assert_eq!(c.state().emotions.intimacy, 51.0);
    assert_eq!(c.state().emotions.trust, 21.0);
    assert_eq!(c.state().emotions.pleasure, 58.0);
}

#[test]
fn memory_refresh_and_snapshot_resume_round_trip() {
    let mut replies: Vec<Result<String, GeneratorError>> = Vec::new();
    for _ in 0..9 {
        replies.push(Ok(delta_reply("{}")));
    }
    replies.push(Ok(delta_reply("{}")));
    replies.push(Ok(
        "Mira and the visitor meet nightly; she has started saving them a seat.".to_owned(),
    ));

    let mut c = controller(
        init_with(EmotionVector::default(), RelationshipStatus::Acquaintance),
        replies,
    );
    for _ in 0..10 {
        assert!(matches!(c.take_turn("hi"), TurnOutcome::Committed(_)));
    }
    assert!(c.long_memory().contains("saving them a seat"));
    assert_eq!(c.state().turn_counter, 10);

    // Round-trip the snapshot through JSON, then keep playing.
    let json = c.snapshot().to_json().unwrap();
    let snapshot = SessionSnapshot::from_json(&json).unwrap();
    let mut resumed = TurnController::resume(
        snapshot,
        EngineConfig::default(),
        ScriptedGenerator::new(vec![Ok(delta_reply(r#"{"P": 2}"#))]),
    );
    resumed.pin_tier(Some(GachaTier::Normal));

    assert_eq!(resumed.state().turn_counter, 10);
    assert!(resumed.long_memory().contains("saving them a seat"));
    let TurnOutcome::Committed(report) = resumed.take_turn("miss me?") else {
        panic!("resumed turn must commit");
    };
    assert_eq!(report.emotions.pleasure, 52.0);
    assert_eq!(resumed.state().turn_counter, 11);
}

#[test]
fn jackpot_overreaction_saturates_and_refreshes() {
    let mut c = controller(
        init_with(EmotionVector::default(), RelationshipStatus::Acquaintance),
        vec![Ok(delta_reply(r#"{"A": 10, "P": 10}"#))],
    );
    c.pin_tier(Some(GachaTier::Jackpot));

    let TurnOutcome::Committed(report) = c.take_turn("surprise!") else {
        panic!("expected commit");
    };
    assert_eq!(report.final_delta.pleasure, 50.0);
    assert_eq!(c.state().emotions.pleasure, 100.0, "clamped at the ceiling");
    assert_eq!(c.state().emotions.arousal, 90.0);
    assert!(report
        .visual_triggers
        .iter()
        .any(|t| matches!(t, animus_core::VisualTrigger::GachaTier(GachaTier::Jackpot))));
}

//! Ingestion pipeline for raw generator output.
//!
//! Generator text is unreliable in layered ways: markdown fences around
//! the payload, prose before or after it, illegal `+5` number literals,
//! broken objects followed by valid ones, wrong value types inside the
//! delta. The pipeline runs repair stages in a fixed order and either
//! produces a fully normalized [`GeneratorReply`] or a typed
//! [`IngestError`]; it never panics, whatever the input.
//!
//! Stage order: fence/BOM stripping, plus-sign repair, brace-matched
//! object extraction (first decodable object wins), field validation,
//! per-axis delta coercion.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::relationship::RelationshipStatus;
use crate::types::{Axis, ProposedDelta};

/// Why a raw reply could not be ingested.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// No decodable JSON object anywhere in the text.
    #[error("no valid JSON object found in generator output")]
    NoObject,

    /// The object decoded but lacks required fields.
    #[error("generator reply missing required fields: {0}")]
    MissingFields(String),

    /// `proposed_delta` is present but not a JSON object.
    #[error("proposed_delta must be a JSON object, got {0}")]
    MalformedDelta(String),
}

/// A fully validated and normalized generator reply.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorReply {
    /// Internal monologue, never shown to the player directly.
    pub thought: String,
    /// Spoken dialogue line.
    pub speech: String,
    /// Narrated action accompanying the speech.
    pub action: String,
    /// Free-text emotion tag.
    pub emotion: String,
    /// Whether the generator flagged a visual change this turn.
    pub visual_change: bool,
    /// Scene description for the image renderer.
    pub visual_prompt: String,
    /// Current scene background, empty to keep the previous one.
    pub background: String,
    /// Free-text reason attached to the visual change flag.
    pub reason: String,
    /// Per-axis delta, already coerced and clamped to [-10, 10].
    pub proposed_delta: ProposedDelta,
    /// Relationship status the generator claims to have entered, if it
    /// flagged a change and named a recognizable status.
    pub claimed_status: Option<RelationshipStatus>,
}

/// Run the full pipeline on raw generator text.
pub fn parse_reply(raw: &str) -> Result<GeneratorReply, IngestError> {
    let cleaned = preprocess(raw);
    let object = extract_object(&cleaned).ok_or(IngestError::NoObject)?;
    normalize(&object)
}

// ---------------------------------------------------------------------------
// Stage 1: textual repair
// ---------------------------------------------------------------------------

/// Strip markdown fences (with or without a `json` tag), leading BOM
/// characters and whitespace, then repair illegal `+N` literals.
fn preprocess(raw: &str) -> String {
    let defenced = strip_fences(raw);
    let trimmed = defenced
        .trim_start_matches('\u{feff}')
        .trim_start()
        .to_owned();
    repair_plus_signs(&trimmed)
}

/// Remove every ``` fence marker, its optional case-insensitive `json`
/// tag, and the whitespace that follows.
fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            rest = &rest[4..];
        }
        rest = rest.trim_start();
    }
    out.push_str(rest);
    out
}

/// Drop the `+` in `"key": +5`, which serde rejects. Only a plus in
/// value position (after `":` and optional whitespace, before a digit)
/// is touched, so plus signs inside string values survive.
fn repair_plus_signs(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Idle,
        Quote,
        ColonValue,
    }

    let mut out = String::with_capacity(text.len());
    let mut state = State::Idle;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                state = State::Quote;
                out.push(ch);
            }
            ':' if state == State::Quote => {
                state = State::ColonValue;
                out.push(ch);
            }
            c if c.is_whitespace() && state == State::ColonValue => {
                out.push(c);
            }
            '+' if state == State::ColonValue
                && chars.peek().is_some_and(char::is_ascii_digit) =>
            {
                // Skip the sign; the digits follow unchanged.
                state = State::Idle;
            }
            _ => {
                state = State::Idle;
                out.push(ch);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Stage 2: object extraction
// ---------------------------------------------------------------------------

/// Brace-matched scan for the first decodable top-level JSON object.
///
/// On a decode failure the scan resets and continues after the failed
/// candidate's opening brace, so a broken object followed by a valid
/// one still ingests.
fn extract_object(text: &str) -> Option<Map<String, Value>> {
    let mut depth: u32 = 0;
    let mut start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(s) = start.take() {
                        let candidate = &text[s..=i];
                        match serde_json::from_str::<Value>(candidate) {
                            Ok(Value::Object(map)) => return Some(map),
                            Ok(_) => {}
                            Err(err) => {
                                debug!(%err, len = candidate.len(), "candidate object failed to decode, continuing scan");
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Stage 3: validation and coercion
// ---------------------------------------------------------------------------

const REQUIRED_FIELDS: [&str; 4] = ["thought", "speech", "emotion", "proposed_delta"];

fn normalize(map: &Map<String, Value>) -> Result<GeneratorReply, IngestError> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| !map.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingFields(missing.join(", ")));
    }

    let delta_value = &map["proposed_delta"];
    let Some(delta_map) = delta_value.as_object() else {
        return Err(IngestError::MalformedDelta(type_name(delta_value).to_owned()));
    };

    let mut proposed_delta = ProposedDelta::default();
    for axis in Axis::ALL {
        proposed_delta.set(axis, coerce_axis(axis, delta_map.get(axis.key())));
    }

    let claimed_status = extract_claim(map);

    Ok(GeneratorReply {
        thought: string_field(map, "thought"),
        speech: string_field(map, "speech"),
        action: string_field(map, "action_speech"),
        emotion: map
            .get("emotion")
            .and_then(Value::as_str)
            .unwrap_or("neutral")
            .to_owned(),
        visual_change: map
            .get("visual_change_detected")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        visual_prompt: string_field(map, "visual_prompt"),
        background: string_field(map, "background"),
        reason: string_field(map, "reason"),
        proposed_delta,
        claimed_status,
    })
}

/// Coerce one delta entry to an integer in [-10, 10].
///
/// Numbers truncate toward zero; strings are stripped of `+` signs and
/// padding before parsing; anything else collapses to zero.
fn coerce_axis(axis: Axis, value: Option<&Value>) -> i32 {
    let raw = match value {
        None => 0,
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i
            } else {
                #[allow(clippy::cast_possible_truncation)]
                n.as_f64().map_or(0, |f| f.trunc() as i64)
            }
        }
        Some(Value::String(s)) => {
            let stripped = s.replace('+', "");
            match stripped.trim().parse::<i64>() {
                Ok(i) => i,
                Err(_) => {
                    warn!(axis = %axis, value = %s, "unparseable delta string, using 0");
                    0
                }
            }
        }
        Some(other) => {
            warn!(axis = %axis, value = ?other, "non-numeric delta value, using 0");
            0
        }
    };
    #[allow(clippy::cast_possible_truncation)]
    let clamped = raw.clamp(-10, 10) as i32;
    clamped
}

/// Read the optional status-change claim. Recognized only when the
/// change flag is set and the name parses as a known status.
fn extract_claim(map: &Map<String, Value>) -> Option<RelationshipStatus> {
    if !map
        .get("relationship_status_change")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return None;
    }
    let name = map.get("new_status_name").and_then(Value::as_str)?;
    match name.parse::<RelationshipStatus>() {
        Ok(status) => Some(status),
        Err(()) => {
            warn!(%name, "unrecognized claimed status name, ignoring claim");
            None
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "thought": "hm",
        "speech": "hello",
        "emotion": "happy",
        "proposed_delta": {"P": 5, "A": -2, "D": 0, "I": 3, "T": 1, "Dep": 0}
    }"#;

    #[test]
    fn clean_json_ingests_directly() {
        let reply = parse_reply(MINIMAL).unwrap();
        assert_eq!(reply.speech, "hello");
        assert_eq!(reply.proposed_delta.pleasure, 5);
        assert_eq!(reply.proposed_delta.arousal, -2);
        assert!(!reply.visual_change);
        assert_eq!(reply.claimed_status, None);
    }

    #[test]
    fn fenced_output_is_unwrapped() {
        let fenced = format!("```json\n{MINIMAL}\n```");
        assert!(parse_reply(&fenced).is_ok());
        let upper = format!("```JSON\n{MINIMAL}\n```");
        assert!(parse_reply(&upper).is_ok());
        let bare = format!("```\n{MINIMAL}\n```");
        assert!(parse_reply(&bare).is_ok());
    }

    #[test]
    fn bom_and_surrounding_prose_are_tolerated() {
        let noisy = format!("\u{feff}  Sure, here is the reply:\n{MINIMAL}\nHope that helps!");
        assert!(parse_reply(&noisy).is_ok());
    }

    #[test]
    fn plus_prefixed_numbers_are_repaired() {
        let raw = r#"{
            "thought": "t", "speech": "s", "emotion": "e",
            "proposed_delta": {"P": +5, "A": +10, "D": -3, "I": 0, "T": 0, "Dep": 0}
        }"#;
        let reply = parse_reply(raw).unwrap();
        assert_eq!(reply.proposed_delta.pleasure, 5);
        assert_eq!(reply.proposed_delta.arousal, 10);
        assert_eq!(reply.proposed_delta.dominance, -3);
    }

    #[test]
    fn plus_signs_inside_string_values_survive() {
        let raw = r#"{
            "thought": "t", "speech": "A+ effort, +1 from me", "emotion": "e",
            "proposed_delta": {"P": 1, "A": 0, "D": 0, "I": 0, "T": 0, "Dep": 0}
        }"#;
        let reply = parse_reply(raw).unwrap();
        assert_eq!(reply.speech, "A+ effort, +1 from me");
    }

    #[test]
    fn broken_object_followed_by_valid_one_ingests() {
        let raw = format!("{{\"oops\": }}\n{MINIMAL}");
        assert!(parse_reply(&raw).is_ok());
    }

    #[test]
    fn missing_required_fields_are_named() {
        let raw = r#"{"speech": "hi", "proposed_delta": {}}"#;
        match parse_reply(raw) {
            Err(IngestError::MissingFields(fields)) => {
                assert_eq!(fields, "thought, emotion");
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn non_object_delta_is_rejected() {
        let raw = r#"{"thought": "t", "speech": "s", "emotion": "e", "proposed_delta": [1, 2]}"#;
        assert_eq!(
            parse_reply(raw),
            Err(IngestError::MalformedDelta("array".to_owned()))
        );
    }

    #[test]
    fn delta_values_coerce_and_clamp() {
        let raw = r#"{
            "thought": "t", "speech": "s", "emotion": "e",
            "proposed_delta": {
                "P": "+5", "A": " -3 ", "D": 7.9, "I": "abc", "T": null, "Dep": 100
            }
        }"#;
        let delta = parse_reply(raw).unwrap().proposed_delta;
        assert_eq!(delta.pleasure, 5, "string with plus sign parses");
        assert_eq!(delta.arousal, -3, "padded negative string parses");
        assert_eq!(delta.dominance, 7, "float truncates toward zero");
        assert_eq!(delta.intimacy, 0, "garbage string collapses to zero");
        assert_eq!(delta.trust, 0, "null collapses to zero");
        assert_eq!(delta.dependency, 10, "out-of-band value clamps");
    }

    #[test]
    fn absent_delta_keys_default_to_zero() {
        let raw = r#"{"thought": "t", "speech": "s", "emotion": "e", "proposed_delta": {"P": 4}}"#;
        let delta = parse_reply(raw).unwrap().proposed_delta;
        assert_eq!(delta.pleasure, 4);
        assert_eq!(delta.trust, 0);
        assert_eq!(delta.dependency, 0);
    }

    #[test]
    fn status_claims_require_flag_and_known_name() {
        let claimed = r#"{
            "thought": "t", "speech": "s", "emotion": "e", "proposed_delta": {},
            "relationship_status_change": true, "new_status_name": "Lover"
        }"#;
        assert_eq!(
            parse_reply(claimed).unwrap().claimed_status,
            Some(RelationshipStatus::Lover)
        );

        let unflagged = r#"{
            "thought": "t", "speech": "s", "emotion": "e", "proposed_delta": {},
            "new_status_name": "Lover"
        }"#;
        assert_eq!(parse_reply(unflagged).unwrap().claimed_status, None);

        let unknown = r#"{
            "thought": "t", "speech": "s", "emotion": "e", "proposed_delta": {},
            "relationship_status_change": true, "new_status_name": "Soulmate"
        }"#;
        assert_eq!(parse_reply(unknown).unwrap().claimed_status, None);
    }

    #[test]
    fn garbage_yields_no_object() {
        assert_eq!(parse_reply(""), Err(IngestError::NoObject));
        assert_eq!(parse_reply("no json here"), Err(IngestError::NoObject));
        assert_eq!(parse_reply("{{{{"), Err(IngestError::NoObject));
        assert_eq!(parse_reply("[1, 2, 3]"), Err(IngestError::NoObject));
    }
}

//! Prompt assembly for generation requests.
//!
//! The controller hands its collaborator exactly one assembled prompt
//! per call; every piece of session context the generator may use is
//! serialized here. Section order is stable so downstream prompt
//! caching stays effective.

use std::fmt::Write;

use crate::history::RecencyBuffer;
use crate::relationship::{entry_condition, RelationshipStatus};
use crate::session::{SessionInit, SessionState};
use crate::trauma::TraumaBand;

/// Turns during which the opening scenario framing stays in the prompt.
const OPENING_CONTEXT_TURNS: u64 = 10;

/// Assemble the full prompt for one dialogue turn.
#[must_use]
pub fn build_turn_prompt(
    state: &SessionState,
    init: &SessionInit,
    history: &RecencyBuffer,
    long_memory: &str,
    player_input: &str,
) -> String {
    let profile = &init.profile;
    let mut p = String::with_capacity(4096);

    // Identity.
    let _ = writeln!(p, "# Character");
    let _ = writeln!(p, "You are {}, {} years old.", profile.name, profile.age);
    let _ = writeln!(p, "Appearance: {}", profile.appearance);
    let _ = writeln!(p, "Personality: {}", profile.personality);
    let _ = writeln!(p, "Speech style: {}", profile.speech_style);
    let _ = writeln!(p, "The player you are talking to is {}.", init.player_name);
    p.push('\n');

    // Axes and current state.
    let _ = writeln!(p, "# Internal State");
    let _ = writeln!(
        p,
        "Six axes, each 0-100: P (pleasure), A (arousal/agitation), D \
         (dominance), I (intimacy), T (trust), Dep (dependency)."
    );
    let _ = writeln!(p, "Current: {}", state.emotions.summary());
    let _ = writeln!(p, "Intimacy: {}", state.emotions.intimacy_level());
    let _ = writeln!(p, "Trust: {}", state.emotions.trust_level());
    let _ = writeln!(p, "Dependency: {}", state.emotions.dependency_level());
    let _ = writeln!(p, "Relationship status: {}", state.status);
    p.push('\n');

    // Behavioral directives: mood, badge, trauma.
    let mood = state.mood();
    let _ = writeln!(p, "## Mood ({mood})");
    let _ = writeln!(p, "{}", mood.behavior_hint());
    p.push('\n');

    if let Some(badge) = state.active_badge() {
        let _ = writeln!(p, "## Active Badge ({badge})");
        let _ = writeln!(p, "{}", badge.behavior_hint());
        p.push('\n');
    }

    let band = state.trauma_band();
    if band != TraumaBand::CleanSlate {
        let _ = writeln!(p, "{}", band.instruction());
        p.push('\n');
    }

    if let Some(instruction) = claim_instruction(state) {
        p.push_str(&instruction);
        p.push('\n');
    }

    // Memory and context.
    if !long_memory.is_empty() {
        let _ = writeln!(p, "# Long-Term Memory");
        let _ = writeln!(p, "{long_memory}");
        p.push('\n');
    }

    if state.turn_counter < OPENING_CONTEXT_TURNS && !init.opening_context.is_empty() {
        let _ = writeln!(p, "# Opening Scenario");
        let _ = writeln!(p, "{}", init.opening_context);
        p.push('\n');
    }

    let _ = writeln!(p, "Current scene background: {}", state.background);
    p.push('\n');

    if !history.is_empty() {
        let _ = writeln!(p, "# Recent Dialogue");
        p.push_str(&history.format_for_prompt(&profile.name, &init.player_name));
        p.push('\n');
    }

    let _ = writeln!(p, "# Player Says");
    let _ = writeln!(p, "{player_input}");
    p.push('\n');

    p.push_str(output_contract());
    p
}

/// Assemble the prompt for a long-term memory refresh.
#[must_use]
pub fn build_memory_prompt(
    init: &SessionInit,
    history: &RecencyBuffer,
    long_memory: &str,
) -> String {
    let mut p = String::with_capacity(2048);
    let _ = writeln!(
        p,
        "Summarize the relationship between {} and {} so far, in third \
         person, as a compact paragraph. Keep concrete facts (promises, \
         conflicts, confessions, shared plans) and drop small talk.",
        init.profile.name, init.player_name
    );
    p.push('\n');
    if !long_memory.is_empty() {
        let _ = writeln!(p, "# Previous Summary");
        let _ = writeln!(p, "{long_memory}");
        p.push('\n');
    }
    let _ = writeln!(p, "# Recent Dialogue");
    p.push_str(&history.format_for_prompt(&init.profile.name, &init.player_name));
    p.push('\n');
    let _ = writeln!(p, "Reply with the updated summary only, no preamble.");
    p
}

/// Instruction block listing the narratively-decided statuses the
/// generator may currently claim, with their numeric conditions. Absent
/// when no successor is claimable from the current status.
fn claim_instruction(state: &SessionState) -> Option<String> {
    let claimable: Vec<RelationshipStatus> = state
        .status
        .successors()
        .iter()
        .copied()
        .filter(|s| s.is_claimable())
        .collect();
    if claimable.is_empty() {
        return None;
    }

    let mut out = String::new();
    let _ = writeln!(out, "## Relationship Progression");
    let _ = writeln!(
        out,
        "If the scene itself marks the relationship becoming one of the \
         following, set \"relationship_status_change\": true and \
         \"new_status_name\" to that name. Only do so when the listed \
         condition already holds; claims that do not are discarded."
    );
    for status in claimable {
        let conditions = entry_condition(state.status, status);
        let rendered: Vec<String> = conditions.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "- {status}: requires {}", rendered.join(" and "));
    }
    Some(out)
}

/// The JSON reply contract appended to every turn prompt.
fn output_contract() -> &'static str {
    "# Output Format\n\
     Reply with a single JSON object and nothing else:\n\
     {\n\
     \x20 \"thought\": \"your private inner monologue\",\n\
     \x20 \"speech\": \"what you say out loud\",\n\
     \x20 \"action_speech\": \"narrated action, third person\",\n\
     \x20 \"emotion\": \"one word for your current emotion\",\n\
     \x20 \"proposed_delta\": {\"P\": 0, \"A\": 0, \"D\": 0, \"I\": 0, \"T\": 0, \"Dep\": 0},\n\
     \x20 \"visual_change_detected\": false,\n\
     \x20 \"visual_prompt\": \"scene description if visuals changed\",\n\
     \x20 \"background\": \"current scene background\",\n\
     \x20 \"reason\": \"why visuals changed, if they did\",\n\
     \x20 \"relationship_status_change\": false,\n\
     \x20 \"new_status_name\": \"\"\n\
     }\n\
     Each proposed_delta value is an integer between -10 and 10 \
     describing how this exchange moved the corresponding axis.\n"
}

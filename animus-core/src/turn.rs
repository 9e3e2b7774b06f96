//! The turn controller: one full decision cycle per player input.
//!
//! A turn either commits atomically or leaves the session untouched.
//! All mutation happens on a staged clone of the state; the clone is
//! swapped in only at the commit point, so a generator failure or an
//! unparseable reply can never leave the session half-updated. A
//! pre-check transition that fired on a failed turn is recomputed from
//! the same inputs next turn and fires again, with no double effects.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::badge::{match_badge, Badge};
use crate::config::EngineConfig;
use crate::gacha::{roll_tier, GachaTier};
use crate::generator::{GenerationRequest, GeneratorError, ImageRenderer, TextGenerator};
use crate::history::{DialogueTurn, RecencyBuffer};
use crate::ingest::{parse_reply, GeneratorReply};
use crate::mood::Mood;
use crate::prompt::{build_memory_prompt, build_turn_prompt};
use crate::relationship::{
    detect_transition, resolve_dissolution, validate_claim, RelationshipStatus, Transition,
};
use crate::session::{SessionInit, SessionSnapshot, SessionState};
use crate::types::{EmotionVector, FinalDelta, ProposedDelta};

// ---------------------------------------------------------------------------
// Turn outputs
// ---------------------------------------------------------------------------

/// One reason the presentation layer should refresh its image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualTrigger {
    /// The generator flagged a visual change itself.
    GeneratorRequest {
        /// The generator's stated reason.
        reason: String,
    },
    /// The scene background changed this turn.
    BackgroundChanged {
        /// Background before the turn.
        from: String,
        /// Background after the turn.
        to: String,
    },
    /// Too many turns have passed without an image.
    ForcedRefresh {
        /// Committed turns since the last image.
        turns: u64,
    },
    /// A high gacha tier landed.
    GachaTier(GachaTier),
    /// The relationship entered a status that warrants a new image.
    Transition(RelationshipStatus),
}

/// Everything the presentation layer needs about one finished turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    /// Spoken dialogue line.
    pub speech: String,
    /// Internal monologue.
    pub thought: String,
    /// Narrated action.
    pub action: String,
    /// Free-text emotion tag from the generator.
    pub emotion: String,
    /// Mood label after the turn.
    pub mood: Mood,
    /// All badges earned so far, in acquisition order; the last entry
    /// is active.
    pub badges: Vec<Badge>,
    /// Active badge after the turn.
    pub active_badge: Option<Badge>,
    /// Badge newly acquired this turn, if any.
    pub new_badge: Option<Badge>,
    /// Relationship status after the turn.
    pub status: RelationshipStatus,
    /// Automatic transition that fired in the pre-check, if any.
    pub pre_transition: Option<Transition>,
    /// Generator-claimed transition that validated, if any.
    pub claimed_transition: Option<Transition>,
    /// Gacha tier rolled this turn.
    pub gacha_tier: GachaTier,
    /// The tier's multiplier.
    pub multiplier: f32,
    /// The normalized delta the generator proposed.
    pub proposed_delta: ProposedDelta,
    /// The gacha-scaled delta (pre-clamp, pre-trauma).
    pub final_delta: FinalDelta,
    /// Axis values after the turn.
    pub emotions: EmotionVector,
    /// Trauma level after the turn.
    pub trauma: f32,
    /// Why an image refresh is due, in evaluation order. Empty means
    /// no refresh this turn.
    pub visual_triggers: Vec<VisualTrigger>,
    /// Scene background after the turn.
    pub background: String,
    /// Scene description the generator supplied for rendering.
    pub visual_prompt: String,
    /// Rendered image bytes, when a renderer is attached and a trigger
    /// fired. Render failures leave this empty without failing the turn.
    pub image: Option<Vec<u8>>,
}

/// Three-way outcome of a turn.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The turn committed; all state changes are applied.
    Committed(TurnReport),
    /// The generator answered but the reply was unusable; a canned
    /// report is returned and the session is unchanged.
    Fallback(TurnReport),
    /// The generator call itself failed; the session is unchanged.
    Fatal(GeneratorError),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives full dialogue turns against a text generator and an optional
/// image renderer.
pub struct TurnController {
    config: EngineConfig,
    init: SessionInit,
    state: SessionState,
    history: RecencyBuffer,
    long_memory: String,
    turns_since_image: u64,
    rng: StdRng,
    pinned_tier: Option<GachaTier>,
    generator: Box<dyn TextGenerator>,
    renderer: Option<Box<dyn ImageRenderer>>,
}

impl TurnController {
    /// Start a fresh session.
    #[must_use]
    pub fn new(init: SessionInit, config: EngineConfig, generator: Box<dyn TextGenerator>) -> Self {
        let state = SessionState::from_init(&init);
        let history = RecencyBuffer::new(config.memory.recency_turns);
        info!(session = %state.id, persona = %init.profile.name, "session started");
        Self {
            config,
            init,
            state,
            history,
            long_memory: String::new(),
            turns_since_image: 0,
            rng: StdRng::from_entropy(),
            pinned_tier: None,
            generator,
            renderer: None,
        }
    }

    /// Resume a session from a snapshot.
    #[must_use]
    pub fn resume(
        snapshot: SessionSnapshot,
        config: EngineConfig,
        generator: Box<dyn TextGenerator>,
    ) -> Self {
        info!(
            session = %snapshot.state.id,
            turns = snapshot.state.turn_counter,
            saved_at = %snapshot.saved_at,
            "session resumed"
        );
        Self {
            config,
            init: snapshot.init,
            state: snapshot.state,
            history: snapshot.history,
            long_memory: snapshot.long_memory,
            turns_since_image: snapshot.turns_since_image,
            rng: StdRng::from_entropy(),
            pinned_tier: None,
            generator,
            renderer: None,
        }
    }

    /// Attach an image renderer.
    pub fn attach_renderer(&mut self, renderer: Box<dyn ImageRenderer>) {
        self.renderer = Some(renderer);
    }

    /// Replace the RNG with a seeded one, for replays and tests.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Pin (or unpin) the gacha tier instead of rolling.
    pub fn pin_tier(&mut self, tier: Option<GachaTier>) {
        self.pinned_tier = tier;
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current recency buffer.
    #[must_use]
    pub fn history(&self) -> &RecencyBuffer {
        &self.history
    }

    /// Current long-term memory blob.
    #[must_use]
    pub fn long_memory(&self) -> &str {
        &self.long_memory
    }

    /// Committed turns since the last rendered image.
    #[must_use]
    pub fn turns_since_image(&self) -> u64 {
        self.turns_since_image
    }

    /// Capture a complete snapshot of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            saved_at: chrono::Utc::now(),
            state: self.state.clone(),
            history: self.history.clone(),
            long_memory: self.long_memory.clone(),
            turns_since_image: self.turns_since_image,
            init: self.init.clone(),
        }
    }

    /// Run one full dialogue turn.
    pub fn take_turn(&mut self, player_input: &str) -> TurnOutcome {
        // All mutation below happens on the staged clone until commit.
        let mut staged = self.state.clone();

        // Pre-check: at most one automatic transition, resolved before
        // the generator sees the state.
        let pre_transition = detect_transition(&staged);
        if let Some(transition) = pre_transition {
            info!(from = %transition.from, to = %transition.to, "automatic status transition");
            staged.status = transition.to;
            resolve_dissolution(&mut staged);
        }

        let prompt =
            build_turn_prompt(&staged, &self.init, &self.history, &self.long_memory, player_input);
        let raw = match self.generator.generate(&self.request(prompt)) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "generation failed, turn aborted");
                return TurnOutcome::Fatal(err);
            }
        };

        let reply = match parse_reply(&raw) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(%err, raw_len = raw.len(), "reply unusable, serving fallback");
                return TurnOutcome::Fallback(self.fallback_report());
            }
        };

        // Gacha scaling, then trauma-aware application.
        let tier = self
            .pinned_tier
            .unwrap_or_else(|| roll_tier(&mut self.rng));
        let multiplier = tier.multiplier();
        let final_delta = reply.proposed_delta.scaled(multiplier);
        staged.emotions.apply(&final_delta, staged.trauma);
        debug!(tier = %tier, multiplier, axes = %staged.emotions.summary(), "delta applied");

        // Badge check on the post-delta axes.
        let new_badge = match_badge(&staged.emotions)
            .filter(|badge| staged.acquire_badge(*badge));

        // Generator-claimed transition, validated against the graph.
        let claimed_transition = reply
            .claimed_status
            .and_then(|claimed| validate_claim(&staged, claimed));
        if let Some(transition) = claimed_transition {
            info!(from = %transition.from, to = %transition.to, "claimed status transition accepted");
            staged.status = transition.to;
        }

        // Background update and visual triggers.
        let previous_background = staged.background.clone();
        let background_changed =
            !reply.background.is_empty() && reply.background != staged.background;
        if background_changed {
            staged.background = reply.background.clone();
        }

        let visual_triggers = self.collect_visual_triggers(
            &reply,
            background_changed.then(|| (previous_background, reply.background.clone())),
            tier,
            pre_transition,
            claimed_transition,
        );

        let image = if visual_triggers.is_empty() {
            None
        } else {
            self.render_image(&reply, &staged)
        };

        // Commit point: everything below is infallible.
        staged.turn_counter += 1;
        self.turns_since_image = if visual_triggers.is_empty() {
            self.turns_since_image + 1
        } else {
            0
        };
        self.history.push(DialogueTurn {
            turn: staged.turn_counter,
            player: player_input.to_owned(),
            speech: reply.speech.clone(),
            thought: reply.thought.clone(),
            emotion: reply.emotion.clone(),
            visual: reply.visual_prompt.clone(),
            background: staged.background.clone(),
        });
        self.state = staged;

        if self.config.memory.refresh_interval > 0
            && self.state.turn_counter % self.config.memory.refresh_interval == 0
        {
            self.refresh_long_memory();
        }

        TurnOutcome::Committed(TurnReport {
            speech: reply.speech,
            thought: reply.thought,
            action: reply.action,
            emotion: reply.emotion,
            mood: self.state.mood(),
            badges: self.state.badges.clone(),
            active_badge: self.state.active_badge(),
            new_badge,
            status: self.state.status,
            pre_transition,
            claimed_transition,
            gacha_tier: tier,
            multiplier,
            proposed_delta: reply.proposed_delta,
            final_delta,
            emotions: self.state.emotions,
            trauma: self.state.trauma,
            visual_triggers,
            background: self.state.background.clone(),
            visual_prompt: reply.visual_prompt,
            image,
        })
    }

    fn request(&self, prompt: String) -> GenerationRequest {
        GenerationRequest {
            prompt,
            temperature: self.config.generation.temperature,
            top_p: self.config.generation.top_p,
            max_tokens: self.config.generation.max_tokens,
            timeout_ms: self.config.generation.timeout_ms,
        }
    }

    /// Gather image-refresh reasons in evaluation order.
    fn collect_visual_triggers(
        &self,
        reply: &GeneratorReply,
        background_change: Option<(String, String)>,
        tier: GachaTier,
        pre_transition: Option<Transition>,
        claimed_transition: Option<Transition>,
    ) -> Vec<VisualTrigger> {
        let mut triggers = Vec::new();
        if let Some((from, to)) = background_change {
            triggers.push(VisualTrigger::BackgroundChanged { from, to });
        }
        if reply.visual_change {
            triggers.push(VisualTrigger::GeneratorRequest {
                reason: reply.reason.clone(),
            });
        }
        if tier.forces_visual() {
            triggers.push(VisualTrigger::GachaTier(tier));
        }
        for transition in [pre_transition, claimed_transition].into_iter().flatten() {
            if transition.to.forces_visual() {
                triggers.push(VisualTrigger::Transition(transition.to));
            }
        }
        let pending = self.turns_since_image + 1;
        if self.config.visual.force_refresh_turns > 0
            && pending >= self.config.visual.force_refresh_turns
        {
            triggers.push(VisualTrigger::ForcedRefresh { turns: pending });
        }
        triggers
    }

    /// Render via the attached renderer, if any. A render failure is
    /// logged and swallowed; the turn still commits.
    fn render_image(&mut self, reply: &GeneratorReply, staged: &SessionState) -> Option<Vec<u8>> {
        let renderer = self.renderer.as_mut()?;
        let scene = if reply.visual_prompt.is_empty() {
            staged.background.as_str()
        } else {
            reply.visual_prompt.as_str()
        };
        match renderer.render(&self.init.profile.appearance, scene) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(%err, "image rendering failed, continuing without image");
                None
            }
        }
    }

    /// Second generation call every N committed turns: fold the recency
    /// window into the long-term memory blob. Failure keeps the
    /// previous blob.
    fn refresh_long_memory(&mut self) {
        let prompt = build_memory_prompt(&self.init, &self.history, &self.long_memory);
        match self.generator.generate(&self.request(prompt)) {
            Ok(summary) if !summary.trim().is_empty() => {
                self.long_memory =
                    truncate_summary(summary.trim(), self.config.memory.max_chars);
                info!(
                    turn = self.state.turn_counter,
                    chars = self.long_memory.chars().count(),
                    "long-term memory refreshed"
                );
            }
            Ok(_) => {
                warn!("memory refresh returned empty text, keeping previous memory");
            }
            Err(err) => {
                warn!(%err, "memory refresh failed, keeping previous memory");
            }
        }
    }

    fn fallback_report(&self) -> TurnReport {
        TurnReport {
            speech: "Sorry... I lost my train of thought for a moment. What were you saying?"
                .to_owned(),
            thought: "(The words would not come out right.)".to_owned(),
            action: String::new(),
            emotion: "confused".to_owned(),
            mood: self.state.mood(),
            badges: self.state.badges.clone(),
            active_badge: self.state.active_badge(),
            new_badge: None,
            status: self.state.status,
            pre_transition: None,
            claimed_transition: None,
            gacha_tier: GachaTier::Normal,
            multiplier: GachaTier::Normal.multiplier(),
            proposed_delta: ProposedDelta::default(),
            final_delta: FinalDelta::default(),
            emotions: self.state.emotions,
            trauma: self.state.trauma,
            visual_triggers: Vec::new(),
            background: self.state.background.clone(),
            visual_prompt: String::new(),
            image: None,
        }
    }
}

/// Cut a summary to at most `max_chars` characters, preferring a
/// sentence or word boundary in the final stretch of the window.
fn truncate_summary(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_owned();
    }
    let window_start = max_chars.saturating_sub(50);
    let cut = chars[window_start..max_chars]
        .iter()
        .rposition(|c| *c == '.' || *c == ' ')
        .map_or(max_chars, |i| window_start + i + 1);
    chars[..cut].iter().collect::<String>().trim_end().to_owned()
}

//! Session state, initialization, and snapshot persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::badge::Badge;
use crate::error::{EngineError, Result};
use crate::history::RecencyBuffer;
use crate::mood::Mood;
use crate::relationship::RelationshipStatus;
use crate::trauma::TraumaBand;
use crate::types::{EmotionVector, PersonaProfile, SessionId};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The persistent per-session simulation state.
///
/// Everything the rule engine reads or writes lives here; transient
/// per-turn values (deltas, gacha tiers, triggers) never do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique session identifier.
    pub id: SessionId,
    /// The six-axis emotional state.
    pub emotions: EmotionVector,
    /// Current relationship status.
    pub status: RelationshipStatus,
    /// Accumulated dissolution scarring in [0, 1]. Never decreases
    /// within a session.
    pub trauma: f32,
    /// Badges in acquisition order; the last entry is active.
    pub badges: Vec<Badge>,
    /// Committed turns so far.
    pub turn_counter: u64,
    /// Current scene background description.
    pub background: String,
}

impl SessionState {
    /// Build the initial state for a new session.
    #[must_use]
    pub fn from_init(init: &SessionInit) -> Self {
        Self {
            id: SessionId::new(),
            emotions: init.axes,
            status: init.status,
            trauma: 0.0,
            badges: Vec::new(),
            turn_counter: 0,
            background: init.background.clone(),
        }
    }

    /// Record a badge. Idempotent: re-acquiring never duplicates or
    /// reorders. Returns whether the badge was newly added.
    pub fn acquire_badge(&mut self, badge: Badge) -> bool {
        if self.badges.contains(&badge) {
            return false;
        }
        info!(badge = %badge, "badge acquired");
        self.badges.push(badge);
        true
    }

    /// The most recently acquired badge, if any.
    #[must_use]
    pub fn active_badge(&self) -> Option<Badge> {
        self.badges.last().copied()
    }

    /// Current mood label for the PAD axes.
    #[must_use]
    pub fn mood(&self) -> Mood {
        Mood::classify(&self.emotions)
    }

    /// Current trauma band for the continuous trauma level.
    #[must_use]
    pub fn trauma_band(&self) -> TraumaBand {
        TraumaBand::for_level(self.trauma)
    }

    #[cfg(test)]
    pub(crate) fn bare(emotions: EmotionVector) -> Self {
        Self {
            id: SessionId::new(),
            emotions,
            status: RelationshipStatus::Stranger,
            trauma: 0.0,
            badges: Vec::new(),
            turn_counter: 0,
            background: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session initialization
// ---------------------------------------------------------------------------

/// Everything the setup layer supplies to start a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInit {
    /// Starting axis values.
    #[serde(default)]
    pub axes: EmotionVector,
    /// Starting relationship status.
    #[serde(default = "default_status")]
    pub status: RelationshipStatus,
    /// Starting scene background.
    #[serde(default)]
    pub background: String,
    /// The persona's character sheet.
    pub profile: PersonaProfile,
    /// How the persona addresses the player.
    pub player_name: String,
    /// Scenario framing included in early-session prompts.
    #[serde(default)]
    pub opening_context: String,
}

fn default_status() -> RelationshipStatus {
    RelationshipStatus::Stranger
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A complete, self-contained save of one session.
///
/// Holds everything needed to resume mid-relationship: state, dialogue
/// window, long-term memory, image cadence, and the original init so
/// prompts rebuild identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// The persistent session state.
    pub state: SessionState,
    /// The recency buffer at save time.
    pub history: RecencyBuffer,
    /// The long-term memory blob at save time.
    pub long_memory: String,
    /// Committed turns since the last rendered image.
    pub turns_since_image: u64,
    /// The init the session was started from.
    pub init: SessionInit,
}

impl SessionSnapshot {
    /// Serialize to pretty JSON.
    ///
    /// # Errors
    /// Returns [`EngineError::Snapshot`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    /// Returns [`EngineError::Snapshot`] if the document is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    /// Write the snapshot to a file as JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), session = %self.state.id, "session snapshot saved");
        Ok(())
    }

    /// Read a snapshot back from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the read or deserialization fails.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

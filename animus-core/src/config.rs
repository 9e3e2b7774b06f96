//! Engine configuration, loadable from TOML.
//!
//! Every field has a default, so an empty document (or no file at all)
//! yields a fully working configuration.

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Context window and memory cadence.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Image refresh cadence.
    #[serde(default)]
    pub visual: VisualConfig,
    /// Sampling parameters forwarded with every generation request.
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`crate::EngineError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::EngineError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Context window and long-term memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Committed turns kept verbatim in the recency buffer.
    #[serde(default = "default_recency_turns")]
    pub recency_turns: usize,
    /// Committed turns between long-term memory refreshes.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Maximum length of the long-term memory blob, in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            recency_turns: default_recency_turns(),
            refresh_interval: default_refresh_interval(),
            max_chars: default_max_chars(),
        }
    }
}

/// Image refresh cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    /// Committed turns without an image before a refresh is forced.
    #[serde(default = "default_force_refresh_turns")]
    pub force_refresh_turns: u64,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            force_refresh_turns: default_force_refresh_turns(),
        }
    }
}

/// Sampling parameters for generation requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Maximum tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_recency_turns() -> usize {
    10
}

fn default_refresh_interval() -> u64 {
    10
}

fn default_max_chars() -> usize {
    500
}

fn default_force_refresh_turns() -> u64 {
    5
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    600
}

fn default_timeout_ms() -> u64 {
    60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = EngineConfig::from_toml("").unwrap();
        assert_eq!(cfg.memory.recency_turns, 10);
        assert_eq!(cfg.memory.refresh_interval, 10);
        assert_eq!(cfg.memory.max_chars, 500);
        assert_eq!(cfg.visual.force_refresh_turns, 5);
        assert!((cfg.generation.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.generation.max_tokens, 600);
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let cfg = EngineConfig::from_toml(
            "[memory]\nrecency_turns = 4\n\n[generation]\ntemperature = 1.1\n",
        )
        .unwrap();
        assert_eq!(cfg.memory.recency_turns, 4);
        assert_eq!(cfg.memory.refresh_interval, 10);
        assert!((cfg.generation.temperature - 1.1).abs() < f32::EPSILON);
        assert_eq!(cfg.generation.max_tokens, 600);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = EngineConfig::from_toml("memory = notatable").unwrap_err();
        assert!(matches!(err, crate::EngineError::Config(_)));
    }

    #[test]
    fn file_round_trip_via_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animus.toml");
        std::fs::write(&path, "[visual]\nforce_refresh_turns = 3\n").unwrap();
        let cfg = EngineConfig::from_file(&path).unwrap();
        assert_eq!(cfg.visual.force_refresh_turns, 3);
    }
}

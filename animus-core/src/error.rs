//! Error types for the ANIMUS core library.

use thiserror::Error;

/// Top-level error type for engine housekeeping operations
/// (configuration and snapshot handling).
///
/// Per-turn failures are deliberately *not* represented here: a failed
/// collaborator call surfaces as [`crate::TurnOutcome::Fatal`] and an
/// unparseable reply as [`crate::TurnOutcome::Fallback`], so call sites
/// cannot confuse the two.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Session snapshot could not be serialized or deserialized.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;

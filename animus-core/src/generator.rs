//! Collaborator seams: text generation and image rendering.
//!
//! The engine is backend-agnostic. It hands a collaborator one fully
//! assembled prompt per call and receives raw text back; everything
//! else (transport, endpoints, auth) lives behind these traits.

use thiserror::Error;

/// A single generation call: one opaque prompt plus sampling knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// The complete assembled prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Failure modes of a collaborator call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// No backend is configured or reachable.
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),

    /// The call exceeded its timeout.
    #[error("generation timed out after {0} ms")]
    Timeout(u64),

    /// The backend answered with an empty body.
    #[error("generation backend returned an empty reply")]
    EmptyReply,

    /// The call failed at the transport or protocol level.
    #[error("generation request failed: {0}")]
    RequestFailed(String),
}

/// Text-generation collaborator.
///
/// One call per turn (two on memory-refresh turns). Implementations
/// must not retry internally; retry policy belongs to the caller.
pub trait TextGenerator {
    /// Generate raw text for the supplied request.
    fn generate(&mut self, request: &GenerationRequest) -> Result<String, GeneratorError>;
}

/// Image-rendering collaborator. Optional; when absent, visual
/// triggers are still reported but nothing is rendered.
pub trait ImageRenderer {
    /// Render an image for the given appearance tags and scene prompt.
    fn render(&mut self, appearance: &str, scene: &str) -> Result<Vec<u8>, GeneratorError>;
}

//! # animus-llm — LLM transport layer for ANIMUS
//!
//! Thin blocking HTTP transport behind the engine's
//! [`TextGenerator`](animus_core::TextGenerator) seam:
//!   - **Ollama** (local, recommended default)
//!   - **OpenAI-compatible API** (also works with most hosted providers)
//!   - **None** — every call fails, exercising the engine's fatal path
//!
//! This crate deliberately does nothing but transport. Prompt assembly,
//! reply repair and retry policy all live upstream in `animus-core`; a
//! request here is one HTTP call with one timeout.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;

pub use client::{LlmClient, LlmProvider};

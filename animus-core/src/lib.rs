//! # ANIMUS Core Library
//!
//! Decision core for an interactive persona simulation: a six-axis
//! emotion/relationship state engine plus an ingestion pipeline for
//! unreliable generator output.
//!
//! Each session tracks an [`EmotionVector`] over six axes — P/A/D (the
//! Russell & Mehrabian PAD mood space, 1977) plus Intimacy, Trust and
//! Dependency — and a [`RelationshipStatus`] on a fixed directed graph.
//! A [`TurnController`] drives one decision cycle per player input:
//!
//! 1. Pre-check the status graph for an automatic transition.
//! 2. Assemble one prompt and call the [`TextGenerator`] collaborator.
//! 3. Repair, extract and normalize the reply ([`ingest`]).
//! 4. Scale the proposed delta by a gacha roll, dampen by trauma, apply.
//! 5. Evaluate badges, validate claimed transitions, collect visual
//!    triggers, and commit atomically.
//!
//! A turn either commits in full or leaves the session untouched; the
//! three-way [`TurnOutcome`] keeps generator failures, unusable replies
//! and committed turns distinct at the type level.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod badge;
pub mod config;
pub mod error;
pub mod gacha;
pub mod generator;
pub mod history;
pub mod ingest;
pub mod mood;
pub mod prompt;
pub mod relationship;
pub mod session;
pub mod trauma;
pub mod turn;
pub mod types;

pub use badge::{match_badge, Badge};
pub use config::EngineConfig;
pub use error::EngineError;
pub use gacha::GachaTier;
pub use generator::{GenerationRequest, GeneratorError, ImageRenderer, TextGenerator};
pub use history::{DialogueTurn, RecencyBuffer};
pub use ingest::{parse_reply, GeneratorReply, IngestError};
pub use mood::Mood;
pub use relationship::{RelationshipStatus, Transition};
pub use session::{SessionInit, SessionSnapshot, SessionState};
pub use trauma::TraumaBand;
pub use turn::{TurnController, TurnOutcome, TurnReport, VisualTrigger};
pub use types::*;

//! Agent runtime - reasoning providers and the per-turn orchestration loop
//!
//! This crate owns everything that touches the outside world during a turn:
//!
//! 1. **Retrieval** (`retriever`) - runs the repository text query and the
//!    core constraint filters to produce the turn's candidate set
//! 2. **Reasoning** (`provider`, `adapters`) - the pluggable
//!    `ReasoningProvider` contract plus one adapter per vendor, selected by
//!    configuration at process start and injected by the composition root
//! 3. **Orchestration** (`orchestrator`) - the turn state machine that
//!    sequences retrieval, context assembly, reasoning, Truth-Mode
//!    validation, safety annotation, and persistence
//!
//! # Safety Principle
//!
//! Providers are untrusted. Every payload goes through strict JSON
//! extraction (`payload`) and set-membership validation before anything is
//! persisted or shown; any failure collapses to a fixed safe fallback. The
//! user-visible turn contract never returns an error.

pub mod adapters;
pub mod orchestrator;
pub mod payload;
pub mod provider;
pub mod retriever;
pub mod transcription;

pub use adapters::{AnthropicProvider, GeminiProvider, ScriptedProvider};
pub use orchestrator::{TurnOrchestrator, TurnSettings, TurnState};
pub use provider::{build_provider, ProviderError, ReasoningProvider};
pub use retriever::CandidateRetriever;
pub use transcription::{DisabledTranscription, Transcription, TranscriptionProvider};

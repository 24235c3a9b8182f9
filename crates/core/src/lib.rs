//! Shelfwise core - domain model and the pure halves of the grounding pipeline
//!
//! Everything in this crate is deterministic and free of I/O. The pipeline's
//! guarantee ("Truth Mode": the assistant only ever references verifiably
//! in-stock catalog items) is enforced by composing:
//!
//! 1. **Retrieval** (`retrieval`) - utterance tokenization, synonym expansion,
//!    and the fixed-order constraint filters that produce the turn's allowed
//!    candidate set
//! 2. **Context assembly** (`grounding::context`) - rendering candidates,
//!    store policy, and constraints into a provider-agnostic reasoning context
//! 3. **Validation** (`grounding::validator`) - set-membership filtering of
//!    untrusted provider output against the allowed set
//! 4. **Safety annotation** (`grounding::safety`) - static hazard-keyword
//!    disclaimers
//!
//! # Safety Principle
//!
//! The reasoning provider is strictly untrusted. It never decides what exists,
//! what is in stock, or what a product costs. Those facts come from the
//! catalog; anything the provider says that is not backed by the allowed set
//! is filtered out before a human sees it.

pub mod config;
pub mod domain;
pub mod grounding;
pub mod retrieval;

pub use config::{AppConfig, ConfigError, LoadOptions, ReasoningVendor};
pub use domain::constraints::SearchConstraints;
pub use domain::conversation::{Conversation, ConversationId, ConversationMessage, MessageRole};
pub use domain::inventory::{InventoryItem, ItemId};
pub use domain::policy::StorePolicy;
pub use domain::reasoning::{CartRequest, ReasoningOutput};
pub use domain::turn::{CartLine, ProductCard, TurnLog, TurnMetadata, TurnRequest, TurnResponse};
pub use grounding::fallback::{safe_fallback, FallbackReason};
pub use grounding::validator::{validate, TruthValidation};
pub use retrieval::{AllowedSet, InventoryQuery};

//! Knowledge-base integration for StudyBot.
//!
//! Two pieces: a thin HTTP client for the knowledge service's `/search`
//! endpoint, and the relevance gate that decides, from match scores and two
//! allowlists, whether a message is allowed to reach the external model at
//! all. The gate fails open on service errors: an unreachable knowledge base
//! degrades answers, it does not break the bot.

pub mod client;
pub mod gate;

pub use client::{KnowledgeClient, KnowledgeError, SearchHit, SearchResponse};
pub use gate::{GateDecision, KnowledgeGate, DEFAULT_THRESHOLD, OUT_OF_SCOPE_REPLY};

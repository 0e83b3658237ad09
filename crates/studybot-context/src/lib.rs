//! Per-user conversational context for StudyBot.
//!
//! Holds the short-lived state the dialog engine needs between turns: the
//! active slot-filling flow and step, the last classification result, and the
//! rolling external-model conversation. Context is in-memory,
//! single-process, and expires after an idle window (600 s by default);
//! it is never persisted and never shared across bot instances.

pub mod context;
pub mod manager;

pub use context::{
    ContextUpdate, ConversationTurn, Flow, Role, UserContext, LOW_CONFIDENCE,
    MAX_CONVERSATION_TURNS,
};
pub use manager::{ContextManager, DEFAULT_EXPIRY};

//! Dialog engine for StudyBot.
//!
//! This crate turns inbound messages into reply strings. The
//! [`DialogEngine`] routes each message through the authentication gate,
//! active-flow re-entry, the complexity heuristic, and intent
//! classification; recognized intents run the slot-filling
//! [`FlowEngine`](flows::FlowEngine), and everything complex or
//! low-confidence escalates through the knowledge gate to the external
//! model.
//!
//! The engine is the single owner of all per-user conversational state; the
//! Telegram front-end holds it in an `Arc` and calls
//! [`DialogEngine::process_message`] once per inbound text message.

pub mod engine;
pub mod flows;

pub use engine::DialogEngine;
pub use flows::FlowEngine;

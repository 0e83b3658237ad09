//! External model integration for StudyBot.
//!
//! Complex and low-confidence questions escalate to the Anthropic messages
//! API. This crate holds the API client and the bridge the dialog engine
//! talks to: the bridge owns the default system instruction, folds in the
//! knowledge gate's context block, maps every failure variant to a fixed
//! user-visible fallback reply, and maintains the capped rolling
//! conversation history.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: API credential (required for escalation)
//! - `CLAUDE_MODEL`: Model id override (default: claude-3-opus-20240229)

pub mod bridge;
pub mod client;

pub use bridge::{fallback_for, ModelBridge, TIMEOUT_REPLY, TROUBLE_REPLY, UNEXPECTED_REPLY};
pub use client::{ClaudeClient, ClaudeError, Result, DEFAULT_MODEL};

//! Telegram bot interface for StudyBot.
//!
//! This crate provides the Telegram front-end for the Master's programme
//! learning assistant: commands for onboarding and login, and a message
//! handler that routes every plain text message through the dialog engine.
//!
//! # Features
//!
//! - Course information, assignment and learning-material flows
//! - Knowledge-gated escalation of complex questions to the Anthropic API
//! - OAuth login handled by an external auth service (the bot only verifies)
//! - Per-user interaction logging to simple JSON files
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `ANTHROPIC_API_KEY`: Enables complex-question escalation
//! - `CLAUDE_MODEL`: Model id override
//! - `AUTH_SERVICE_URL`: Authentication service (default: http://localhost:5050)
//! - `KNOWLEDGE_SERVICE_URL`: Knowledge base (default: http://localhost:5000)
//! - `KNOWLEDGE_THRESHOLD`: Relevance threshold (default: 65)
//! - `STUDYBOT_STATE_DIR`: State directory (default: ~/.studybot)
//!
//! # Example
//!
//! ```no_run
//! use studybot_telegram::StudyBot;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state_dir = Path::new("/path/to/state");
//!     let bot = StudyBot::new(state_dir)?;
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start` - Welcome message
//! - `/help` - Usage examples
//! - `/login` - Check auth status / get the login link

pub mod bot;
pub mod error;
pub mod handlers;
pub mod state;

pub use bot::StudyBot;
pub use error::{BotError, Result};
pub use state::{create_shared_state, BotState};

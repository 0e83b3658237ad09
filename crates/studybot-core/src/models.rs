//! Persisted user models.
//!
//! These are the only durable records StudyBot keeps: a small profile per
//! Telegram user and a rolling log of their interactions, used by the /start
//! handler and for lightweight usage review. Conversation context is
//! deliberately *not* persisted; it lives in memory with an expiry window.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile of a Telegram user known to the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Opaque Telegram user identifier.
    pub user_id: String,

    /// First name as reported by Telegram.
    pub first_name: String,

    /// Telegram username, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// When the profile was first created.
    pub created_at: DateTime<Utc>,

    /// When the user last sent a message.
    pub last_active: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a new profile for a first-time user.
    pub fn new(user_id: impl Into<String>, first_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            first_name: first_name.into(),
            username: None,
            created_at: now,
            last_active: now,
        }
    }

    /// Sets the Telegram username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Refreshes the last-active timestamp.
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

/// A single processed message, recorded for usage review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Opaque Telegram user identifier.
    pub user_id: String,

    /// The raw message text.
    pub message: String,

    /// Classified intent name ("unknown" when nothing matched).
    pub intent: String,

    /// Extracted entities, keyed by entity kind.
    #[serde(default)]
    pub entities: HashMap<String, Vec<String>>,

    /// When the message was processed.
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    /// Creates a new interaction record stamped with the current time.
    pub fn new(
        user_id: impl Into<String>,
        message: impl Into<String>,
        intent: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            intent: intent.into(),
            entities: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attaches extracted entities to the record.
    pub fn with_entities(mut self, entities: HashMap<String, Vec<String>>) -> Self {
        self.entities = entities;
        self
    }
}

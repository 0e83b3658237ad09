//! Shared state for the Telegram bot.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use studybot_core::{Interaction, UserProfile, UserStore};
use studybot_dialog::DialogEngine;

/// Shared state for the Telegram bot, accessible across all handlers.
pub struct BotState {
    /// The dialog engine (owns all conversational context).
    engine: DialogEngine,
    /// Per-user profile and interaction persistence.
    store: UserStore,
}

impl BotState {
    /// Create state with an engine built from environment configuration.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            engine: DialogEngine::from_env(),
            store: UserStore::new(state_dir),
        }
    }

    /// Create state over a specific engine (for testing).
    pub fn with_engine(engine: DialogEngine, state_dir: &Path) -> Self {
        Self {
            engine,
            store: UserStore::new(state_dir),
        }
    }

    /// Get a reference to the dialog engine.
    pub fn engine(&self) -> &DialogEngine {
        &self.engine
    }

    /// Create or refresh the user's profile.
    ///
    /// Store failures are logged, never surfaced: profile persistence must
    /// not break message handling.
    pub fn touch_user(&self, user_id: &str, first_name: &str, username: Option<&str>) {
        let profile = match self.store.load_profile(user_id) {
            Ok(Some(mut existing)) => {
                existing.touch();
                existing
            }
            Ok(None) => {
                debug!(user_id = %user_id, "Creating profile for new user");
                let profile = UserProfile::new(user_id, first_name);
                match username {
                    Some(u) => profile.with_username(u),
                    None => profile,
                }
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load profile");
                return;
            }
        };

        if let Err(e) = self.store.save_profile(&profile) {
            warn!(user_id = %user_id, error = %e, "Failed to save profile");
        }
    }

    /// Process one message through the dialog engine and record the
    /// interaction.
    pub async fn process_message(&self, user_id: &str, text: &str) -> String {
        let reply = self.engine.process_message(user_id, text).await;

        // Pull intent and entities out of the post-turn context for the log.
        let (intent, entities) = match self.engine.snapshot(user_id).await {
            Some(ctx) => {
                let intent = ctx
                    .last_intent
                    .map(|i| i.as_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let entities: HashMap<String, Vec<String>> = ctx
                    .last_entities
                    .iter()
                    .map(|(kind, values)| (kind.as_str().to_string(), values.clone()))
                    .collect();
                (intent, entities)
            }
            None => ("unknown".to_string(), HashMap::new()),
        };

        let interaction = Interaction::new(user_id, text, intent).with_entities(entities);
        if let Err(e) = self.store.record_interaction(&interaction) {
            warn!(user_id = %user_id, error = %e, "Failed to record interaction");
        }

        reply
    }
}

/// Create a shared state wrapped in Arc for use across handlers.
pub fn create_shared_state(state_dir: &Path) -> Arc<BotState> {
    Arc::new(BotState::new(state_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybot_core::AuthClient;
    use studybot_dialog::DialogEngine;
    use studybot_knowledge::{KnowledgeClient, KnowledgeGate};
    use tempfile::tempdir;

    fn offline_state(dir: &Path) -> BotState {
        let engine = DialogEngine::new(
            AuthClient::disabled(),
            KnowledgeGate::new(KnowledgeClient::new("http://localhost:5000")),
            None,
        );
        BotState::with_engine(engine, dir)
    }

    #[test]
    fn test_touch_user_creates_profile() {
        let dir = tempdir().unwrap();
        let state = offline_state(dir.path());

        state.touch_user("12345", "Ada", Some("ada_l"));

        let store = UserStore::new(dir.path());
        let profile = store.load_profile("12345").unwrap().unwrap();
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.username.as_deref(), Some("ada_l"));
    }

    #[tokio::test]
    async fn test_process_message_records_interaction() {
        let dir = tempdir().unwrap();
        let state = offline_state(dir.path());

        let reply = state.process_message("12345", "Tell me about IS621").await;
        assert!(reply.contains("Agile and DevSecOps"));

        let store = UserStore::new(dir.path());
        let interactions = store.load_interactions("12345").unwrap();
        assert_eq!(interactions.len(), 1);
        assert_eq!(interactions[0].intent, "course_info");
        assert_eq!(interactions[0].entities["course_code"], vec!["621"]);
    }
}

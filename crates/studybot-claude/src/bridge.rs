//! Model bridge: fallback handling and rolling-history management.
//!
//! The bridge is what the dialog engine talks to. It formats the system
//! instruction (optionally extended with the knowledge gate's context block),
//! calls the client, and converts every failure into a fixed user-visible
//! reply; a model outage degrades the answer, it never breaks the turn.
//! History is appended only after a successful call and then truncated to the
//! cap, so fallback strings never pollute the conversation the model sees.

use tracing::{error, warn};

use studybot_context::{ConversationTurn, UserContext};

use crate::client::{ClaudeClient, ClaudeError, Result};

/// Reply when the model call times out.
pub const TIMEOUT_REPLY: &str =
    "I'm currently experiencing delays. Please try again in a moment.";

/// Reply when the model request fails.
pub const TROUBLE_REPLY: &str = "I'm currently having trouble answering complex questions. \
     Please try a simpler question or try again later.";

/// Reply for any other unexpected failure.
pub const UNEXPECTED_REPLY: &str =
    "I encountered an unexpected error. Please try again with a different question.";

/// Default system instruction for the assistant.
const SYSTEM_PROMPT: &str = "You are an AI assistant for Master's programme students. Your role is to provide \
helpful, accurate information about courses, assignments, and learning materials.

Focus on providing educational guidance and support. Keep your responses concise, \
informative, and tailored to academic contexts.

When you don't know specific information about the programme, you should indicate \
this clearly rather than making up information.

For course-specific queries, you have knowledge about the following courses:
- IS621: Agile and DevSecOps
- IS622: Cloud Computing and Container Architecture
- IS623: AI and Machine Learning
- IS624: Big Data and Analytics
- IS625: Software Quality Management";

/// The fixed reply for a failed model call.
pub fn fallback_for(error: &ClaudeError) -> &'static str {
    match error {
        ClaudeError::Timeout => TIMEOUT_REPLY,
        ClaudeError::RequestFailed(_) | ClaudeError::MissingKey => TROUBLE_REPLY,
        ClaudeError::ParseError(_) => UNEXPECTED_REPLY,
    }
}

/// Bridge between the dialog engine and the external model.
pub struct ModelBridge {
    client: ClaudeClient,
    system_prompt: String,
}

impl ModelBridge {
    /// Create a bridge over an existing client.
    pub fn new(client: ClaudeClient) -> Self {
        Self {
            client,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Create a bridge from environment variables.
    ///
    /// Fails only when `ANTHROPIC_API_KEY` is unset; the caller then runs
    /// without model escalation.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClaudeClient::from_env()?))
    }

    /// Build the system instruction, extended with retrieved knowledge when
    /// the gate supplied any.
    fn system_for(&self, knowledge: Option<&str>) -> String {
        match knowledge {
            Some(block) => format!(
                "{}\n\nUse the following retrieved course notes when answering:\n{}",
                self.system_prompt, block
            ),
            None => self.system_prompt.clone(),
        }
    }

    /// Answer a message with the model, updating the rolling history in the
    /// user's context.
    ///
    /// Always returns a reply string; failures map to fixed fallbacks per
    /// error variant and leave the history untouched.
    pub async fn respond(
        &self,
        message: &str,
        ctx: &mut UserContext,
        knowledge: Option<&str>,
    ) -> String {
        let system = self.system_for(knowledge);

        match self.client.send(message, &ctx.conversation, &system).await {
            Ok(text) => {
                ctx.push_turn(ConversationTurn::user(message));
                ctx.push_turn(ConversationTurn::assistant(text.clone()));
                text
            }
            Err(e) => {
                match e {
                    ClaudeError::Timeout => warn!("Model call timed out"),
                    _ => error!(error = %e, "Model call failed"),
                }
                fallback_for(&e).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybot_context::MAX_CONVERSATION_TURNS;

    #[test]
    fn test_system_without_knowledge() {
        let bridge = ModelBridge::new(ClaudeClient::new("test-key"));
        let system = bridge.system_for(None);
        assert!(system.contains("IS621: Agile and DevSecOps"));
        assert!(!system.contains("retrieved course notes"));
    }

    #[test]
    fn test_system_with_knowledge() {
        let bridge = ModelBridge::new(ClaudeClient::new("test-key"));
        let system = bridge.system_for(Some("DevSecOps basics\nShift-left security."));
        assert!(system.contains("retrieved course notes"));
        assert!(system.contains("Shift-left security."));
    }

    #[test]
    fn test_fallback_per_error_variant() {
        assert_eq!(fallback_for(&ClaudeError::Timeout), TIMEOUT_REPLY);
        assert_eq!(
            fallback_for(&ClaudeError::RequestFailed("500".to_string())),
            TROUBLE_REPLY
        );
        assert_eq!(fallback_for(&ClaudeError::MissingKey), TROUBLE_REPLY);
        assert_eq!(
            fallback_for(&ClaudeError::ParseError("no text".to_string())),
            UNEXPECTED_REPLY
        );
    }

    #[test]
    fn test_history_cap_via_push_turn() {
        let mut ctx = UserContext::default();
        for i in 0..8 {
            ctx.push_turn(ConversationTurn::user(format!("q{}", i)));
            ctx.push_turn(ConversationTurn::assistant(format!("a{}", i)));
        }
        assert_eq!(ctx.conversation.len(), MAX_CONVERSATION_TURNS);
        // The five most recent exchanges survive.
        assert_eq!(ctx.conversation[0].content, "q3");
        assert_eq!(ctx.conversation[9].content, "a7");
    }
}

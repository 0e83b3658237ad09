//! The dialog engine.
//!
//! One inbound message becomes exactly one reply string. Routing order:
//!
//! 1. Authentication gate (fail-open; see `studybot-core::auth`).
//! 2. Active-flow re-entry: a user mid-flow goes straight back into it.
//! 3. Complexity escalation: messages tripping the heuristic gate go to the
//!    knowledge gate and then the external model.
//! 4. Classification: intent + entities are folded into the context *before*
//!    flow dispatch, so a first-turn "Tell me about IS621" answers
//!    immediately.
//! 5. Flow dispatch for recognized intents; low-confidence messages escalate;
//!    everything else gets the intent echo reply.
//!
//! The engine owns the [`ContextManager`] behind a `tokio::sync::RwLock`.
//! Normal polling delivers one message at a time, but concurrent turns for
//! the same user are safe: each takes the write lock to snapshot and to
//! write back, and the last writer wins.

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use studybot_claude::ModelBridge;
use studybot_context::{
    ContextManager, ContextUpdate, Flow, UserContext, LOW_CONFIDENCE,
};
use studybot_core::{config, AuthClient};
use studybot_knowledge::{GateDecision, KnowledgeClient, KnowledgeGate, OUT_OF_SCOPE_REPLY};
use studybot_nlp::{ComplexityClassifier, EntityExtractor, Intent, IntentClassifier};

use crate::flows::FlowEngine;

/// Reply when escalation is wanted but no model is configured.
const NO_MODEL_REPLY: &str = "I'm not currently able to handle complex questions. \
     Please try asking a more specific question about courses, assignments, or learning materials.";

/// Processes user messages into replies.
pub struct DialogEngine {
    contexts: RwLock<ContextManager>,
    intents: IntentClassifier,
    extractor: EntityExtractor,
    complexity: ComplexityClassifier,
    flows: FlowEngine,
    gate: KnowledgeGate,
    bridge: Option<ModelBridge>,
    auth: AuthClient,
}

impl DialogEngine {
    /// Creates an engine over the given collaborators.
    ///
    /// `bridge` may be `None` when no API credential is available; the
    /// engine then never escalates and complex questions get the
    /// canned deflection.
    pub fn new(auth: AuthClient, gate: KnowledgeGate, bridge: Option<ModelBridge>) -> Self {
        Self {
            contexts: RwLock::new(ContextManager::with_expiry(config::context_expiry())),
            intents: IntentClassifier::new(),
            extractor: EntityExtractor::new(),
            complexity: ComplexityClassifier::new(),
            flows: FlowEngine::new(),
            gate,
            bridge,
            auth,
        }
    }

    /// Creates an engine from environment configuration.
    ///
    /// A missing `ANTHROPIC_API_KEY` disables model escalation with a
    /// warning rather than failing startup.
    pub fn from_env() -> Self {
        let auth = AuthClient::from_env();
        let gate = KnowledgeGate::with_threshold(
            KnowledgeClient::new(config::knowledge_service_url()),
            config::knowledge_threshold(),
        );
        let bridge = match ModelBridge::from_env() {
            Ok(bridge) => Some(bridge),
            Err(e) => {
                warn!(error = %e, "Model escalation disabled");
                None
            }
        };
        Self::new(auth, gate, bridge)
    }

    /// Whether model escalation is available.
    pub fn has_model(&self) -> bool {
        self.bridge.is_some()
    }

    /// Process one message and produce the reply text.
    pub async fn process_message(&self, user_id: &str, message: &str) -> String {
        if !self.auth.verify(user_id).await {
            info!(user_id = %user_id, "Unauthenticated user, sending login link");
            return self.login_prompt(user_id);
        }

        let mut ctx = {
            let mut contexts = self.contexts.write().await;
            contexts.get(user_id)
        }
        .unwrap_or_default();

        // A user mid-flow goes straight back into it, before any
        // classification of the new message.
        if let (Some(flow), Some(_)) = (ctx.active_flow, ctx.active_step) {
            let reply = self.flows.handle(flow, message, &mut ctx);
            self.write_back(user_id, ctx).await;
            return reply;
        }

        // Complex multi-part questions skip the canned flows entirely.
        if self.bridge.is_some() && self.complexity.is_complex(message) {
            debug!(user_id = %user_id, "Message classified as complex, escalating");
            ctx.last_intent = Some(Intent::ComplexQuestion);
            let reply = self.escalate(message, &mut ctx).await;
            self.write_back(user_id, ctx).await;
            return reply;
        }

        let (intent, confidence) = self.intents.classify(message);
        let entities = self.extractor.extract(message);
        debug!(
            user_id = %user_id,
            intent = intent.as_str(),
            confidence,
            "Message classified"
        );

        // Fold the fresh classification into the context before dispatch so
        // flows see this turn's entities.
        ctx.last_intent = Some(intent);
        ctx.last_confidence = confidence;
        ctx.last_entities = entities;

        if let Some(flow) = Flow::from_intent(intent) {
            let reply = self.flows.handle(flow, message, &mut ctx);
            self.write_back(user_id, ctx).await;
            return reply;
        }

        if self.bridge.is_some() && confidence < LOW_CONFIDENCE {
            debug!(user_id = %user_id, confidence, "Low confidence, escalating");
            let reply = self.escalate(message, &mut ctx).await;
            self.write_back(user_id, ctx).await;
            return reply;
        }

        self.write_back(user_id, ctx).await;
        format!(
            "I understood that as a '{}' request. How can I help you with your courses?",
            intent
        )
    }

    /// A copy of the user's current context, for interaction logging.
    pub async fn snapshot(&self, user_id: &str) -> Option<UserContext> {
        self.contexts.write().await.get(user_id)
    }

    /// Whether the auth service currently reports this user as logged in.
    pub async fn is_authenticated(&self, user_id: &str) -> bool {
        self.auth.verify(user_id).await
    }

    /// The login link for this user.
    pub fn login_link(&self, user_id: &str) -> String {
        self.auth.login_url(user_id)
    }

    /// Drop a user's context, abandoning any active flow.
    pub async fn reset(&self, user_id: &str) {
        self.contexts.write().await.clear(user_id);
    }

    /// Route an escalated message through the knowledge gate and the model.
    async fn escalate(&self, message: &str, ctx: &mut UserContext) -> String {
        let Some(bridge) = &self.bridge else {
            return NO_MODEL_REPLY.to_string();
        };

        match self.gate.check(message).await {
            GateDecision::OutOfScope => OUT_OF_SCOPE_REPLY.to_string(),
            GateDecision::Permitted { knowledge } => {
                bridge.respond(message, ctx, knowledge.as_deref()).await
            }
        }
    }

    /// Persist a processed context, creating the record if needed and
    /// refreshing its expiry timestamp.
    async fn write_back(&self, user_id: &str, ctx: UserContext) {
        let mut contexts = self.contexts.write().await;
        contexts.set(user_id, ContextUpdate::replace(&ctx));
    }

    /// The login prompt for unauthenticated users.
    fn login_prompt(&self, user_id: &str) -> String {
        format!(
            "Welcome to the Master's programme assistant!\n\n\
             To use this bot, you need to authenticate with your university email address.\n\n\
             Please click this link to authenticate: {}",
            self.auth.login_url(user_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An engine with auth disabled, no model, and a gate that would only
    /// matter if escalation ran (it cannot without a bridge).
    fn offline_engine() -> DialogEngine {
        DialogEngine::new(
            AuthClient::disabled(),
            KnowledgeGate::new(KnowledgeClient::new("http://localhost:5000")),
            None,
        )
    }

    #[tokio::test]
    async fn test_course_info_end_to_end() {
        let engine = offline_engine();

        let reply = engine.process_message("u1", "Tell me about IS621").await;

        // Answered from the catalog, no external model involved (none is
        // configured).
        assert!(reply.contains("IS621: Agile and DevSecOps"));

        let ctx = engine.snapshot("u1").await.unwrap();
        assert_eq!(ctx.active_flow, None);
        assert_eq!(ctx.active_step, None);
        assert_eq!(ctx.last_intent, Some(Intent::CourseInfo));
    }

    #[tokio::test]
    async fn test_flow_round_trip_across_messages() {
        let engine = offline_engine();

        let reply = engine.process_message("u1", "tell me about a course").await;
        assert!(reply.contains("provide the course code"));

        let ctx = engine.snapshot("u1").await.unwrap();
        assert_eq!(ctx.active_flow, Some(Flow::CourseInfo));
        assert_eq!(ctx.active_step, Some(1));

        let reply = engine.process_message("u1", "IS623").await;
        assert!(reply.contains("AI and Machine Learning"));

        let ctx = engine.snapshot("u1").await.unwrap();
        assert_eq!(ctx.active_flow, None);
        assert_eq!(ctx.active_step, None);
    }

    #[tokio::test]
    async fn test_unknown_intent_echo() {
        let engine = offline_engine();

        let reply = engine.process_message("u1", "qwerty zxcvb").await;

        assert_eq!(
            reply,
            "I understood that as a 'unknown' request. How can I help you with your courses?"
        );
    }

    #[tokio::test]
    async fn test_assignment_flow_keeps_course_across_turns() {
        let engine = offline_engine();

        engine
            .process_message("u1", "when is the assignment submission for IS622")
            .await;
        let ctx = engine.snapshot("u1").await.unwrap();
        assert_eq!(ctx.active_step, Some(2));
        assert_eq!(ctx.current_course.as_deref(), Some("IS622"));

        let reply = engine.process_message("u1", "project").await;
        assert!(reply.contains("IS622"));
        assert!(reply.contains("group project worth 35%"));
    }

    #[tokio::test]
    async fn test_contexts_isolated_per_user() {
        let engine = offline_engine();

        engine.process_message("u1", "tell me about a course").await;
        engine.process_message("u2", "qwerty zxcvb").await;

        assert_eq!(
            engine.snapshot("u1").await.unwrap().active_flow,
            Some(Flow::CourseInfo)
        );
        assert_eq!(engine.snapshot("u2").await.unwrap().active_flow, None);
    }

    #[tokio::test]
    async fn test_reset_clears_context() {
        let engine = offline_engine();

        engine.process_message("u1", "tell me about a course").await;
        engine.reset("u1").await;

        assert!(engine.snapshot("u1").await.is_none());
    }

    #[tokio::test]
    async fn test_no_model_complex_still_answered_by_flows() {
        // With no bridge, the complexity gate is bypassed and a recognized
        // intent still routes into its flow.
        let engine = offline_engine();

        let reply = engine
            .process_message("u1", "Compare the assignments for IS623")
            .await;

        // The course code tips classification to course_info, which answers
        // from the catalog.
        assert!(reply.contains("IS623"));
    }
}

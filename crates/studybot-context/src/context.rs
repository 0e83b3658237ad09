//! Per-user conversational state.

use serde::{Deserialize, Serialize};

use studybot_nlp::{EntityBag, Intent};

/// Maximum turns kept in the external-model conversation history.
///
/// Ten turns is five exchanges; older turns are dropped first regardless of
/// content, bounding the model's context size.
pub const MAX_CONVERSATION_TURNS: usize = 10;

/// Confidence below which a classified message escalates to the model.
pub const LOW_CONFIDENCE: f32 = 0.2;

/// The multi-turn slot-filling flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Answer course questions from the static catalog.
    CourseInfo,
    /// Walk through course, then assignment/project/exam sub-type.
    Assignment,
    /// Stateless deflection to the student portal.
    Grades,
    /// Point at learning materials for a course.
    LearningMaterial,
}

impl Flow {
    /// The flow that handles a classified intent, if any.
    pub fn from_intent(intent: Intent) -> Option<Flow> {
        match intent {
            Intent::CourseInfo => Some(Flow::CourseInfo),
            Intent::Assignment => Some(Flow::Assignment),
            Intent::Grades => Some(Flow::Grades),
            Intent::LearningMaterial => Some(Flow::LearningMaterial),
            _ => None,
        }
    }

    /// Snake-case name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::CourseInfo => "course_info",
            Flow::Assignment => "assignment",
            Flow::Grades => "grades",
            Flow::LearningMaterial => "learning_material",
        }
    }
}

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student.
    User,
    /// The external model.
    Assistant,
}

impl Role {
    /// Wire-format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of the rolling external-model conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced the turn.
    pub role: Role,
    /// The turn text.
    pub content: String,
}

impl ConversationTurn {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversational state for one user.
///
/// Owned exclusively by the [`ContextManager`](crate::ContextManager); one
/// record per user, never shared across users. Callers always receive clones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserContext {
    /// Flow currently collecting slots, if any.
    pub active_flow: Option<Flow>,
    /// Position within the active flow.
    pub active_step: Option<u8>,
    /// Intent assigned on the most recent turn.
    pub last_intent: Option<Intent>,
    /// Confidence of the most recent classification.
    pub last_confidence: f32,
    /// Entities extracted on the most recent turn.
    pub last_entities: EntityBag,
    /// Course code the active flow is about.
    pub current_course: Option<String>,
    /// Rolling external-model conversation, capped at
    /// [`MAX_CONVERSATION_TURNS`].
    pub conversation: Vec<ConversationTurn>,
}

impl UserContext {
    /// Enter a flow at the given step.
    pub fn enter_flow(&mut self, flow: Flow, step: u8) {
        self.active_flow = Some(flow);
        self.active_step = Some(step);
    }

    /// Leave the active flow (completion or abandonment).
    pub fn clear_flow(&mut self) {
        self.active_flow = None;
        self.active_step = None;
    }

    /// Append a turn, evicting the oldest past the cap.
    pub fn push_turn(&mut self, turn: ConversationTurn) {
        self.conversation.push(turn);
        if self.conversation.len() > MAX_CONVERSATION_TURNS {
            let excess = self.conversation.len() - MAX_CONVERSATION_TURNS;
            self.conversation.drain(..excess);
        }
    }
}

/// A partial context update, merged field-wise by
/// [`ContextManager::set`](crate::ContextManager::set).
///
/// Unset fields leave the existing value untouched; the nested options on
/// flow state and course allow explicitly writing `None`.
#[derive(Debug, Clone, Default)]
pub struct ContextUpdate {
    /// New active flow (outer None = leave unchanged).
    pub active_flow: Option<Option<Flow>>,
    /// New active step (outer None = leave unchanged).
    pub active_step: Option<Option<u8>>,
    /// New last intent (outer None = leave unchanged).
    pub last_intent: Option<Option<Intent>>,
    /// New last confidence.
    pub last_confidence: Option<f32>,
    /// New last entities.
    pub last_entities: Option<EntityBag>,
    /// New current course (outer None = leave unchanged).
    pub current_course: Option<Option<String>>,
    /// New conversation history.
    pub conversation: Option<Vec<ConversationTurn>>,
}

impl ContextUpdate {
    /// An empty update (touches only the expiry timestamp).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a classification result: intent, confidence and entities.
    pub fn classification(intent: Intent, confidence: f32, entities: EntityBag) -> Self {
        Self {
            last_intent: Some(Some(intent)),
            last_confidence: Some(confidence),
            last_entities: Some(entities),
            ..Self::default()
        }
    }

    /// An update that overwrites every field with the given context.
    ///
    /// Used to write a processed snapshot back through the manager's merge
    /// path, which creates the record when absent and refreshes expiry.
    pub fn replace(ctx: &UserContext) -> Self {
        Self {
            active_flow: Some(ctx.active_flow),
            active_step: Some(ctx.active_step),
            last_intent: Some(ctx.last_intent),
            last_confidence: Some(ctx.last_confidence),
            last_entities: Some(ctx.last_entities.clone()),
            current_course: Some(ctx.current_course.clone()),
            conversation: Some(ctx.conversation.clone()),
        }
    }

    /// Apply this update to a context record.
    pub fn apply(self, ctx: &mut UserContext) {
        if let Some(flow) = self.active_flow {
            ctx.active_flow = flow;
        }
        if let Some(step) = self.active_step {
            ctx.active_step = step;
        }
        if let Some(intent) = self.last_intent {
            ctx.last_intent = intent;
        }
        if let Some(confidence) = self.last_confidence {
            ctx.last_confidence = confidence;
        }
        if let Some(entities) = self.last_entities {
            ctx.last_entities = entities;
        }
        if let Some(course) = self.current_course {
            ctx.current_course = course;
        }
        if let Some(conversation) = self.conversation {
            ctx.conversation = conversation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_from_intent() {
        assert_eq!(Flow::from_intent(Intent::CourseInfo), Some(Flow::CourseInfo));
        assert_eq!(Flow::from_intent(Intent::Grades), Some(Flow::Grades));
        assert_eq!(Flow::from_intent(Intent::Greeting), None);
        assert_eq!(Flow::from_intent(Intent::Unknown), None);
    }

    #[test]
    fn test_enter_and_clear_flow() {
        let mut ctx = UserContext::default();
        ctx.enter_flow(Flow::Assignment, 2);
        assert_eq!(ctx.active_flow, Some(Flow::Assignment));
        assert_eq!(ctx.active_step, Some(2));

        ctx.clear_flow();
        assert_eq!(ctx.active_flow, None);
        assert_eq!(ctx.active_step, None);
    }

    #[test]
    fn test_push_turn_caps_history() {
        let mut ctx = UserContext::default();
        for i in 0..25 {
            ctx.push_turn(ConversationTurn::user(format!("message {}", i)));
        }
        assert_eq!(ctx.conversation.len(), MAX_CONVERSATION_TURNS);
        // Oldest dropped first.
        assert_eq!(ctx.conversation[0].content, "message 15");
        assert_eq!(ctx.conversation[9].content, "message 24");
    }

    #[test]
    fn test_update_merges_only_set_fields() {
        let mut ctx = UserContext {
            last_intent: Some(Intent::Greeting),
            last_confidence: 0.5,
            current_course: Some("IS621".to_string()),
            ..UserContext::default()
        };

        ContextUpdate {
            last_confidence: Some(0.9),
            ..ContextUpdate::default()
        }
        .apply(&mut ctx);

        assert_eq!(ctx.last_confidence, 0.9);
        assert_eq!(ctx.last_intent, Some(Intent::Greeting));
        assert_eq!(ctx.current_course.as_deref(), Some("IS621"));
    }

    #[test]
    fn test_update_can_clear_course() {
        let mut ctx = UserContext {
            current_course: Some("IS621".to_string()),
            ..UserContext::default()
        };

        ContextUpdate {
            current_course: Some(None),
            ..ContextUpdate::default()
        }
        .apply(&mut ctx);

        assert_eq!(ctx.current_course, None);
    }

    #[test]
    fn test_turn_serialization() {
        let turn = ConversationTurn::assistant("hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
    }
}

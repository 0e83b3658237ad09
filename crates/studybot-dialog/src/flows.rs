//! Slot-filling flow state machines.
//!
//! Each flow is a small state machine keyed by `active_step`. Step `None`
//! is the first turn (entities come from the classification that routed
//! here); step 1 is always "waiting for a course code" and re-prompts
//! forever without advancing until a valid code arrives or the context
//! expires; the assignment flow adds step 2 for the sub-type question.
//! Completion always clears both `active_flow` and `active_step`.

use tracing::debug;

use studybot_context::{Flow, UserContext};
use studybot_core::catalog;
use studybot_nlp::{full_course_code, EntityBag, EntityExtractor, EntityKind};

/// Prompt when the course-info flow needs a code.
const ASK_CODE_INFO: &str =
    "Which course would you like information about? Please provide the course code (e.g., IS621).";

/// Prompt when the assignment flow needs a code.
const ASK_CODE_ASSIGNMENT: &str = "Which course's assignments are you interested in? \
     Please provide the course code (e.g., IS621).";

/// Prompt when the learning-material flow needs a code.
const ASK_CODE_MATERIAL: &str = "Which course's learning materials are you interested in? \
     Please provide the course code (e.g., IS621).";

/// Re-prompt when a message held no recognizable code.
const INVALID_CODE: &str =
    "I couldn't identify a course code. Please provide a valid course code like IS621.";

/// Fixed deflection for grade questions.
const GRADES_REPLY: &str = "To check your grades, please log into the student portal. \
     I don't have access to your personal grade information.";

/// First course code in an entity bag, as a full "IS###" code.
fn first_code(entities: &EntityBag) -> Option<String> {
    entities
        .get(&EntityKind::CourseCode)
        .and_then(|codes| codes.first())
        .map(|digits| full_course_code(digits))
}

/// Executes the slot-filling flows.
pub struct FlowEngine {
    extractor: EntityExtractor,
}

impl FlowEngine {
    /// Creates a flow engine.
    pub fn new() -> Self {
        Self {
            extractor: EntityExtractor::new(),
        }
    }

    /// Run one turn of a flow, mutating the context's flow state.
    pub fn handle(&self, flow: Flow, message: &str, ctx: &mut UserContext) -> String {
        debug!(flow = flow.as_str(), step = ?ctx.active_step, "Handling flow turn");
        match flow {
            Flow::CourseInfo => self.course_info(message, ctx),
            Flow::Assignment => self.assignment(message, ctx),
            Flow::Grades => GRADES_REPLY.to_string(),
            Flow::LearningMaterial => self.learning_material(message, ctx),
        }
    }

    fn course_info(&self, message: &str, ctx: &mut UserContext) -> String {
        let code = match ctx.active_step {
            // First turn: the code, if any, came in with the routed message.
            None => first_code(&ctx.last_entities),
            // Waiting for a code: look in the current message.
            Some(_) => first_code(&self.extractor.extract(message)),
        };

        match code {
            Some(code) => {
                ctx.clear_flow();
                catalog::course_info(&code)
            }
            None if ctx.active_step.is_none() => {
                ctx.enter_flow(Flow::CourseInfo, 1);
                ASK_CODE_INFO.to_string()
            }
            // Step stays 1; retry until a valid code or the context expires.
            None => INVALID_CODE.to_string(),
        }
    }

    fn assignment(&self, message: &str, ctx: &mut UserContext) -> String {
        match ctx.active_step {
            None => match first_code(&ctx.last_entities) {
                Some(code) => {
                    ctx.current_course = Some(code.clone());
                    ctx.enter_flow(Flow::Assignment, 2);
                    ask_assignment_type(&code)
                }
                None => {
                    ctx.enter_flow(Flow::Assignment, 1);
                    ASK_CODE_ASSIGNMENT.to_string()
                }
            },
            Some(1) => match first_code(&self.extractor.extract(message)) {
                Some(code) => {
                    ctx.current_course = Some(code.clone());
                    ctx.enter_flow(Flow::Assignment, 2);
                    ask_assignment_type(&code)
                }
                None => INVALID_CODE.to_string(),
            },
            // Step 2: sub-type answer. The flow completes here whether or not
            // the reply named a known category.
            Some(_) => {
                let course = ctx
                    .current_course
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string());
                ctx.clear_flow();
                assignment_answer(&course, message)
            }
        }
    }

    fn learning_material(&self, message: &str, ctx: &mut UserContext) -> String {
        let code = match ctx.active_step {
            None => first_code(&ctx.last_entities),
            Some(_) => first_code(&self.extractor.extract(message)),
        };

        match code {
            Some(code) => {
                ctx.clear_flow();
                material_answer(&code)
            }
            None if ctx.active_step.is_none() => {
                ctx.enter_flow(Flow::LearningMaterial, 1);
                ASK_CODE_MATERIAL.to_string()
            }
            None => INVALID_CODE.to_string(),
        }
    }
}

impl Default for FlowEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The assignment sub-type question for a course.
fn ask_assignment_type(course: &str) -> String {
    format!(
        "For {}, do you want to know about assignments, projects, or exams?",
        course
    )
}

/// The canned answer for an assignment sub-type reply.
fn assignment_answer(course: &str, message: &str) -> String {
    let kind = message.to_lowercase();
    if kind.contains("assignment") {
        format!(
            "For {}, there are 2 assignments worth 20% of your final grade. \
             The first assignment is due on March 15th, and the second is due on April 10th.",
            course
        )
    } else if kind.contains("project") {
        format!(
            "For {}, there is a group project worth 35% of your final grade. \
             The project proposal is due on March 1st, and the final submission is due on April 20th.",
            course
        )
    } else if kind.contains("exam") {
        format!(
            "For {}, there is a final exam worth 45% of your final grade. \
             The exam is scheduled for May 5th.",
            course
        )
    } else {
        format!(
            "For {}, there are assignments (20%), a group project (35%), and a final exam (45%). \
             Which would you like to know more about?",
            course
        )
    }
}

/// The learning-material answer for a course code.
fn material_answer(code: &str) -> String {
    let name = catalog::course_name(code).unwrap_or("Unknown Course");
    format!(
        "For {} ({}), you can find lecture slides, reading materials, and tutorial questions \
         on the eLearning portal. Would you like me to recommend additional resources for this course?",
        code, name
    )
}

//! Lexical intent classification.
//!
//! Each intent has a fixed list of regex patterns; a message is scored per
//! intent by counting pattern matches and normalizing by the list length, so
//! intents with longer pattern lists need proportionally more hits to win.
//! This is deliberately not a learned model: the intent set is closed and
//! the patterns are cheap to audit.

use std::fmt;

use regex::Regex;

/// The closed set of intents the bot recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Hello / good morning.
    Greeting,
    /// Goodbye / see you.
    Farewell,
    /// Asking for help or guidance.
    Help,
    /// Asking about a course.
    CourseInfo,
    /// Asking about assignments, deadlines, submissions.
    Assignment,
    /// Asking about grades or results.
    Grades,
    /// Asking about timetables and class times.
    Schedule,
    /// Asking for learning materials and resources.
    LearningMaterial,
    /// Multi-part question escalated to the external model.
    ///
    /// Assigned by the dialog engine when the complexity gate trips; the
    /// classifier itself never returns this.
    ComplexQuestion,
    /// Nothing matched.
    Unknown,
}

impl Intent {
    /// Snake-case name, used in logs and persisted interactions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Farewell => "farewell",
            Intent::Help => "help",
            Intent::CourseInfo => "course_info",
            Intent::Assignment => "assignment",
            Intent::Grades => "grades",
            Intent::Schedule => "schedule",
            Intent::LearningMaterial => "learning_material",
            Intent::ComplexQuestion => "complex_question",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pattern lists per intent, in declaration order.
const INTENT_PATTERNS: &[(Intent, &[&str])] = &[
    (
        Intent::Greeting,
        &[
            r"hello",
            r"hi",
            r"hey",
            r"greetings",
            r"good morning",
            r"good afternoon",
            r"good evening",
        ],
    ),
    (
        Intent::Farewell,
        &[
            r"bye",
            r"goodbye",
            r"see you",
            r"talk to you later",
            r"have a good day",
        ],
    ),
    (
        Intent::Help,
        &[r"help", r"assist", r"support", r"guidance", r"how do I"],
    ),
    (
        Intent::CourseInfo,
        &[
            r"course",
            r"class",
            r"module",
            r"subject",
            r"IS\d{3}",
            r"information about",
            r"tell me about",
            r"details on",
        ],
    ),
    (
        Intent::Assignment,
        &[
            r"assignment",
            r"homework",
            r"project",
            r"task",
            r"submission",
            r"deadline",
            r"due date",
            r"when is",
            r"submit",
        ],
    ),
    (
        Intent::Grades,
        &[
            r"grade",
            r"score",
            r"mark",
            r"performance",
            r"result",
            r"how did I do",
            r"passed",
            r"failed",
        ],
    ),
    (
        Intent::Schedule,
        &[
            r"schedule",
            r"timetable",
            r"calendar",
            r"when",
            r"what time",
            r"date",
            r"class time",
            r"lecture",
            r"session",
        ],
    ),
    (
        Intent::LearningMaterial,
        &[
            r"material",
            r"document",
            r"reading",
            r"textbook",
            r"note",
            r"slide",
            r"resource",
            r"learn",
            r"study",
        ],
    ),
];

/// Classifies messages into intents by pattern scoring.
pub struct IntentClassifier {
    patterns: Vec<(Intent, Vec<Regex>)>,
}

impl IntentClassifier {
    /// Creates a classifier with all pattern lists compiled.
    pub fn new() -> Self {
        let patterns = INTENT_PATTERNS
            .iter()
            .map(|(intent, list)| {
                let compiled = list
                    .iter()
                    .map(|p| Regex::new(&format!("(?i){}", p)).expect("invalid intent pattern"))
                    .collect();
                (*intent, compiled)
            })
            .collect();
        Self { patterns }
    }

    /// Classify the intent of the given text.
    ///
    /// Returns the winning intent with its normalized confidence score.
    /// Ties break by declaration order: the first intent to reach the maximum
    /// score wins. Zero hits everywhere returns `(Unknown, 0.0)`.
    pub fn classify(&self, text: &str) -> (Intent, f32) {
        let text = text.to_lowercase();
        let mut best: Option<(Intent, f32)> = None;

        for (intent, list) in &self.patterns {
            let hits: usize = list.iter().map(|re| re.find_iter(&text).count()).sum();
            if hits == 0 {
                continue;
            }
            let score = hits as f32 / list.len() as f32;
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((*intent, score)),
            }
        }

        best.unwrap_or((Intent::Unknown, 0.0))
    }

    /// Score every intent for the given text, zero-filled.
    ///
    /// Diagnostic companion to [`classify`](Self::classify); returns scores
    /// in declaration order.
    pub fn all_scores(&self, text: &str) -> Vec<(Intent, f32)> {
        let text = text.to_lowercase();
        self.patterns
            .iter()
            .map(|(intent, list)| {
                let hits: usize = list.iter().map(|re| re.find_iter(&text).count()).sum();
                (*intent, hits as f32 / list.len() as f32)
            })
            .collect()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

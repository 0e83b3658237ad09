//! Lexical NLP for StudyBot.
//!
//! Three small, pure components feed the dialog engine:
//!
//! - **entities**: regex extraction of structured values from free text
//! - **intent**: pattern-count scoring over a closed intent set
//! - **complexity**: the heuristic gate for external-model escalation
//!
//! None of these call out anywhere; they are deterministic functions of the
//! message text (plus the static course catalog).

pub mod complexity;
pub mod entities;
pub mod intent;

pub use complexity::ComplexityClassifier;
pub use entities::{full_course_code, EntityBag, EntityExtractor, EntityKind};
pub use intent::{Intent, IntentClassifier};

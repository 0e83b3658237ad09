//! Heuristic complexity gate.
//!
//! Decides whether a message should skip the canned flows and go straight to
//! the external model. The rules are coarse and recall-biased: a simple
//! message escalated needlessly costs one model call, while a complex
//! question forced through a canned flow gives a bad answer.

/// Trigger substrings matched case-sensitively.
///
/// These mirror specific topic spellings ("DevSecOps", the IS623 course
/// title) that lose their signal when lowercased.
const CASE_SENSITIVE_TRIGGERS: &[&str] = &["AI and Machine Learning", "DevSecOps", "traditional"];

/// Trigger substrings matched against the lowercased message.
const CASE_INSENSITIVE_TRIGGERS: &[&str] = &["data science", "career", "content"];

/// Phrases that indicate comparison, causality or career questions.
const COMPLEX_PHRASES: &[&str] = &[
    "compare",
    "difference",
    "similar",
    "pros",
    "cons",
    "advantage",
    "disadvantage",
    "how would",
    "explain",
    "why",
    "multiple",
    "several",
    "various",
    "different",
    "ways",
    "also",
    "as well",
    "furthermore",
    "additional",
    "moreover",
    "career",
    "prospects",
    "future",
    "job",
    "work",
    "industry",
    "prioritize",
    "focus",
    "concentrate",
    "recommend",
    "suggest",
    "between",
    "among",
    "versus",
    "vs",
    "contrast",
    "relationship",
    "impact",
    "effect",
    "influence",
    "result",
    "outcome",
];

/// Word count above which a message counts as complex.
const DEFAULT_WORD_LIMIT: usize = 10;

/// Classifies messages as simple or complex.
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    word_limit: usize,
}

impl ComplexityClassifier {
    /// Creates a classifier with the default word limit.
    pub fn new() -> Self {
        Self {
            word_limit: DEFAULT_WORD_LIMIT,
        }
    }

    /// Creates a classifier with a custom word limit.
    pub fn with_word_limit(word_limit: usize) -> Self {
        Self { word_limit }
    }

    /// Determine whether a message is likely a complex multi-part question.
    ///
    /// Pure function of the message text; no context dependency.
    pub fn is_complex(&self, message: &str) -> bool {
        let lower = message.to_lowercase();

        if CASE_SENSITIVE_TRIGGERS.iter().any(|t| message.contains(t)) {
            return true;
        }

        if CASE_INSENSITIVE_TRIGGERS.iter().any(|t| lower.contains(t)) {
            return true;
        }

        // Complex questions tend to be longer.
        if message.split_whitespace().count() > self.word_limit {
            return true;
        }

        // Multiple questions packed into one message.
        if message.matches('?').count() > 1 {
            return true;
        }

        COMPLEX_PHRASES.iter().any(|p| lower.contains(p))
    }
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_plain_message_is_simple() {
        let classifier = ComplexityClassifier::new();
        assert!(!classifier.is_complex("hello there my good friend"));
    }

    #[test]
    fn test_multiple_question_marks() {
        let classifier = ComplexityClassifier::new();
        assert!(classifier.is_complex("what? when? where?"));
    }

    #[test]
    fn test_single_question_mark_is_simple() {
        let classifier = ComplexityClassifier::new();
        assert!(!classifier.is_complex("what time?"));
    }

    #[test]
    fn test_long_message_is_complex() {
        let classifier = ComplexityClassifier::new();
        let message = "one two three four five six seven eight nine ten eleven";
        assert!(classifier.is_complex(message));
    }

    #[test]
    fn test_case_sensitive_trigger() {
        let classifier = ComplexityClassifier::new();
        assert!(classifier.is_complex("What is DevSecOps"));
        // Lowercased spelling does not trip the case-sensitive trigger,
        // and the message carries no other signal.
        assert!(!classifier.is_complex("what is devsecops"));
    }

    #[test]
    fn test_case_insensitive_trigger() {
        let classifier = ComplexityClassifier::new();
        assert!(classifier.is_complex("Is Data Science hard"));
        assert!(classifier.is_complex("my CAREER plans"));
    }

    #[test]
    fn test_comparison_phrase() {
        let classifier = ComplexityClassifier::new();
        assert!(classifier.is_complex("IS623 versus IS624"));
        assert!(classifier.is_complex("explain the tradeoffs"));
    }

    #[test]
    fn test_custom_word_limit() {
        let classifier = ComplexityClassifier::with_word_limit(3);
        assert!(classifier.is_complex("one two three four"));
    }
}

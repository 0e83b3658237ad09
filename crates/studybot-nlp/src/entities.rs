//! Regex-based entity extraction.
//!
//! Pulls structured values (course codes, dates, times, emails, percentages,
//! bare numbers) out of free text with a fixed set of case-insensitive
//! patterns. Course-code hits additionally derive course names through the
//! static catalog. Absence of a match is a normal empty result, never an
//! error.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use studybot_core::catalog;

/// Kinds of entity the extractor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Three-digit course code following "IS" (the digits are captured).
    CourseCode,
    /// Calendar date like 15/03/2026.
    Date,
    /// Clock time like 14:30 or 2:30pm.
    Time,
    /// Email address.
    Email,
    /// Percentage like 45% or 12.5%.
    Percentage,
    /// Any bare integer.
    Number,
    /// Course name derived from a recognized course code.
    CourseName,
}

impl EntityKind {
    /// Snake-case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::CourseCode => "course_code",
            EntityKind::Date => "date",
            EntityKind::Time => "time",
            EntityKind::Email => "email",
            EntityKind::Percentage => "percentage",
            EntityKind::Number => "number",
            EntityKind::CourseName => "course_name",
        }
    }
}

/// Extracted entities: kind to ordered raw matches.
///
/// A kind is present only when at least one match exists.
pub type EntityBag = BTreeMap<EntityKind, Vec<String>>;

/// Build the full course code ("IS621") from captured digits ("621").
///
/// All programme courses belong to the IS department; the prefix is a domain
/// constraint, not a heuristic.
pub fn full_course_code(digits: &str) -> String {
    format!("IS{}", digits)
}

/// Extracts entities from user messages.
pub struct EntityExtractor {
    patterns: Vec<(EntityKind, Regex)>,
}

impl EntityExtractor {
    /// Creates an extractor with the fixed pattern set compiled.
    pub fn new() -> Self {
        let patterns = vec![
            (EntityKind::CourseCode, r"(?i)IS\s*(\d{3})"),
            (EntityKind::Date, r"(?i)(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})"),
            (EntityKind::Time, r"(?i)(\d{1,2}:\d{2}(?:\s*[aApP][mM])?)"),
            (
                EntityKind::Email,
                r"(?i)([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})",
            ),
            (EntityKind::Percentage, r"(?i)(\d{1,3}(?:\.\d+)?)\s*%"),
            (EntityKind::Number, r"\b(\d+)\b"),
        ];

        Self {
            patterns: patterns
                .into_iter()
                .map(|(kind, p)| (kind, Regex::new(p).expect("invalid entity pattern")))
                .collect(),
        }
    }

    /// Extract all entities from the given text.
    pub fn extract(&self, text: &str) -> EntityBag {
        let mut result = EntityBag::new();

        for (kind, regex) in &self.patterns {
            let matches: Vec<String> = regex
                .captures_iter(text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect();
            if !matches.is_empty() {
                result.insert(*kind, matches);
            }
        }

        // Derive course names for codes the catalog knows; unknown codes are
        // silently skipped.
        if let Some(codes) = result.get(&EntityKind::CourseCode) {
            let names: Vec<String> = codes
                .iter()
                .filter_map(|digits| catalog::course_name(&full_course_code(digits)))
                .map(|n| n.to_string())
                .collect();
            if !names.is_empty() {
                result.insert(EntityKind::CourseName, names);
            }
        }

        result
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

//! Static course catalog.
//!
//! The Master's programme this assistant serves has a fixed set of five IS62x
//! courses. The catalog is configuration, not fetched data: it ships with the
//! binary and backs both entity extraction (course-name derivation) and the
//! course-info flow.

/// A course in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Course {
    /// Full course code, e.g. "IS621".
    pub code: &'static str,
    /// Human-readable course name.
    pub name: &'static str,
    /// One-line course description.
    pub description: &'static str,
}

/// The five programme courses.
const COURSES: [Course; 5] = [
    Course {
        code: "IS621",
        name: "Agile and DevSecOps",
        description: "This course covers agile methodologies and DevSecOps practices for modern software development.",
    },
    Course {
        code: "IS622",
        name: "Cloud Computing and Container Architecture",
        description: "This course covers cloud computing platforms and container technologies.",
    },
    Course {
        code: "IS623",
        name: "AI and Machine Learning",
        description: "This course covers artificial intelligence concepts and machine learning techniques.",
    },
    Course {
        code: "IS624",
        name: "Big Data and Analytics",
        description: "This course covers big data processing and analytics methodologies.",
    },
    Course {
        code: "IS625",
        name: "Software Quality Management",
        description: "This course covers software quality assurance and testing methodologies.",
    },
];

/// Look up a course by its full code (e.g. "IS621").
///
/// Codes are matched case-sensitively; callers normalize to uppercase when
/// building codes from extracted digits.
pub fn find(code: &str) -> Option<&'static Course> {
    COURSES.iter().find(|c| c.code == code)
}

/// Get the human-readable name for a course code, if known.
pub fn course_name(code: &str) -> Option<&'static str> {
    find(code).map(|c| c.name)
}

/// Get the formatted information string for a course code.
///
/// Unknown codes get a pointer to the course catalog rather than an error;
/// the caller treats both as a complete answer.
pub fn course_info(code: &str) -> String {
    match find(code) {
        Some(c) => format!("{}: {} - {}", c.code, c.name, c.description),
        None => format!(
            "I don't have information about {}. Please check the course catalog.",
            code
        ),
    }
}

/// All courses, in catalog order.
pub fn all() -> &'static [Course] {
    &COURSES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_code() {
        let course = find("IS621").unwrap();
        assert_eq!(course.name, "Agile and DevSecOps");
    }

    #[test]
    fn test_find_unknown_code() {
        assert!(find("IS699").is_none());
        assert!(find("is621").is_none()); // case-sensitive
    }

    #[test]
    fn test_course_name() {
        assert_eq!(course_name("IS623"), Some("AI and Machine Learning"));
        assert_eq!(course_name("IS999"), None);
    }

    #[test]
    fn test_course_info_known() {
        let info = course_info("IS625");
        assert!(info.starts_with("IS625: Software Quality Management"));
        assert!(info.contains("quality assurance"));
    }

    #[test]
    fn test_course_info_unknown() {
        let info = course_info("IS700");
        assert!(info.contains("don't have information about IS700"));
    }

    #[test]
    fn test_all_courses() {
        assert_eq!(all().len(), 5);
        assert!(all().iter().all(|c| c.code.starts_with("IS62")));
    }
}
